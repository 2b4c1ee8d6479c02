// API client module: a small blocking HTTP client for the smart-home
// server. One request per call, no retries; every failure is surfaced to
// the caller as a `ClientError`.

use log::{debug, info};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Endpoint;
use crate::error::ClientError;
use crate::model::{Alert, Device, Room, Routine};

const JSON: &str = "application/json";

/// Operations offered by the smart-home server.
///
/// `RemoteClient` is the real implementation; the shell is generic over
/// this trait.
pub trait SmartHomeApi {
    fn list_devices(&self) -> Result<Vec<Device>, ClientError>;
    fn get_device(&self, id: &str) -> Result<Option<Device>, ClientError>;
    fn update_device(&self, id: &str, device: &Device) -> Result<Option<Device>, ClientError>;
    fn execute_action(&self, id: &str, command: &str) -> Result<Option<Device>, ClientError>;
    fn list_routines(&self) -> Result<Vec<Routine>, ClientError>;
    fn create_routine(&self, routine: &Routine) -> Result<Option<Routine>, ClientError>;
    fn list_alerts(&self) -> Result<Vec<Alert>, ClientError>;
    fn get_room(&self, name: &str) -> Result<Option<Room>, ClientError>;
}

/// A server reply sorted by what it actually contains.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// 2xx declared as `application/json`; not yet parsed.
    Json(Vec<u8>),
    /// 2xx with another content type whose body is UTF-8 text.
    Text(String),
    /// 2xx with another content type whose body is not UTF-8.
    Binary(Vec<u8>),
    /// Any status outside 2xx, whatever the content type.
    HttpError { status: u16, body: String },
}

impl Reply {
    pub fn classify(status: u16, content_type: Option<&str>, body: Vec<u8>) -> Self {
        if !(200..300).contains(&status) {
            let body = String::from_utf8_lossy(&body).into_owned();
            return Reply::HttpError { status, body };
        }

        let is_json = content_type
            .map(|value| value.to_ascii_lowercase().contains(JSON))
            .unwrap_or(false);
        if is_json {
            return Reply::Json(body);
        }

        match String::from_utf8(body) {
            Ok(text) => Reply::Text(text),
            Err(err) => Reply::Binary(err.into_bytes()),
        }
    }

    /// Parses a JSON reply, turning every other kind into its error.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        match self {
            Reply::Json(body) => Ok(serde_json::from_slice(&body)?),
            Reply::Text(text) => Err(ClientError::UnexpectedText(text)),
            Reply::Binary(_) => Err(ClientError::UnexpectedBinary),
            Reply::HttpError { status, body } => Err(ClientError::Http { status, body }),
        }
    }
}

/// Blocking client bound to one server for the lifetime of the process.
#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
    base_url: String,
}

impl RemoteClient {
    pub fn new(endpoint: &Endpoint) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));

        let client = Client::builder().default_headers(headers).build()?;
        Ok(RemoteClient {
            client,
            base_url: endpoint.base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        info!("GET {}", path);
        let url = format!("{}{}", self.base_url, path);
        self.send(self.client.get(url))
    }

    /// POST with a JSON body. `RequestBuilder::json` sets the
    /// `Content-Type: application/json` header.
    fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        info!("POST {}", path);
        let url = format!("{}{}", self.base_url, path);
        self.send(self.client.post(url).json(body))
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let res = request.send()?;
        receive(res)?.decode()
    }
}

fn receive(res: Response) -> Result<Reply, ClientError> {
    let status = res.status();
    let content_type = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    debug!("{} ({})", status, content_type.as_deref().unwrap_or("-"));

    match res.bytes() {
        Ok(body) => Ok(Reply::classify(
            status.as_u16(),
            content_type.as_deref(),
            body.to_vec(),
        )),
        Err(_) if !status.is_success() => Ok(Reply::HttpError {
            status: status.as_u16(),
            body: format!("Erro HTTP {}", status.as_u16()),
        }),
        Err(err) => Err(err.into()),
    }
}

impl SmartHomeApi for RemoteClient {
    fn list_devices(&self) -> Result<Vec<Device>, ClientError> {
        self.get("/api/dispositivos")
    }

    fn get_device(&self, id: &str) -> Result<Option<Device>, ClientError> {
        self.post("/api/dispositivos/obter", id)
    }

    fn update_device(&self, id: &str, device: &Device) -> Result<Option<Device>, ClientError> {
        self.post("/api/dispositivos/atualizar", &(id, device))
    }

    fn execute_action(&self, id: &str, command: &str) -> Result<Option<Device>, ClientError> {
        self.post("/api/dispositivos/acao", &[id, command])
    }

    fn list_routines(&self) -> Result<Vec<Routine>, ClientError> {
        self.get("/api/rotinas")
    }

    fn create_routine(&self, routine: &Routine) -> Result<Option<Routine>, ClientError> {
        self.post("/api/rotinas/criar", routine)
    }

    fn list_alerts(&self) -> Result<Vec<Alert>, ClientError> {
        self.get("/api/alertas")
    }

    fn get_room(&self, name: &str) -> Result<Option<Room>, ClientError> {
        self.post("/api/comodos/obter", name)
    }
}
