//! RemoteClient integration tests.
//!
//! Each test starts a throwaway HTTP/1.1 server on `127.0.0.1:0` that answers
//! a fixed number of requests from a handler closure, and hands back what the
//! client actually sent.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use serde_json::{json, Value};
use smarthome_cli::api::{RemoteClient, SmartHomeApi};
use smarthome_cli::config::Endpoint;
use smarthome_cli::error::ClientError;
use smarthome_cli::model::{Action, Device, Routine};

/// What the test server saw.
#[derive(Debug, Clone)]
struct CapturedRequest {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl CapturedRequest {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// What the test server answers.
struct Canned {
    status: u16,
    content_type: Option<&'static str>,
    body: Vec<u8>,
    /// Overrides the advertised `Content-Length`; the connection is closed
    /// after `body` either way.
    declared_length: Option<usize>,
}

impl Canned {
    fn json(body: Value) -> Self {
        Canned {
            status: 200,
            content_type: Some("application/json; charset=UTF-8"),
            body: serde_json::to_vec(&body).unwrap(),
            declared_length: None,
        }
    }
}

type Handler = Box<dyn Fn(&CapturedRequest) -> Canned + Send>;

fn handler(f: impl Fn(&CapturedRequest) -> Canned + Send + 'static) -> Handler {
    Box::new(f)
}

/// Serves one request per handler, in order, then returns everything it saw.
fn serve(handlers: Vec<Handler>) -> (Endpoint, JoinHandle<Vec<CapturedRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for respond in handlers {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_string();
            let path = parts.next().unwrap_or_default().to_string();

            let mut headers = HashMap::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
                }
            }

            let length = headers
                .get("content-length")
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(0);
            let mut body = vec![0; length];
            reader.read_exact(&mut body).unwrap();

            let request = CapturedRequest {
                method,
                path,
                headers,
                body,
            };
            let canned = respond(&request);

            let mut head = format!(
                "HTTP/1.1 {} Canned\r\nContent-Length: {}\r\nConnection: close\r\n",
                canned.status,
                canned.declared_length.unwrap_or(canned.body.len())
            );
            if let Some(content_type) = canned.content_type {
                head.push_str(&format!("Content-Type: {content_type}\r\n"));
            }
            head.push_str("\r\n");

            let mut stream = stream;
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&canned.body).unwrap();
            stream.flush().unwrap();
            seen.push(request);
        }
        seen
    });

    let endpoint = Endpoint {
        host: "127.0.0.1".into(),
        port,
    };
    (endpoint, handle)
}

fn client(endpoint: &Endpoint) -> RemoteClient {
    RemoteClient::new(endpoint).unwrap()
}

#[test]
fn list_devices_sends_get_with_accept_header() {
    let (endpoint, server) = serve(vec![handler(|_| {
        Canned::json(json!([
            {"id": "d1", "nome": "Lampada Sala", "tipo": "Lampada", "online": true, "comodo": "Sala"},
            {"id": "d2", "nome": "Sensor Quarto", "tipo": "Sensor", "online": false}
        ]))
    })]);

    let devices = client(&endpoint).list_devices().unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].nome.as_deref(), Some("Lampada Sala"));
    assert!(devices[0].online);
    assert_eq!(devices[1].comodo, None);

    let seen = server.join().unwrap();
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/api/dispositivos");
    assert_eq!(seen[0].headers["accept"], "application/json");
    assert!(seen[0].body.is_empty());
}

#[test]
fn empty_collection_is_an_empty_list() {
    let (endpoint, server) = serve(vec![handler(|_| Canned::json(json!([])))]);

    let alerts = client(&endpoint).list_alerts().unwrap();
    assert!(alerts.is_empty());
    assert_eq!(server.join().unwrap()[0].path, "/api/alertas");
}

#[test]
fn get_device_posts_id_as_json_string() {
    let (endpoint, server) = serve(vec![handler(|_| {
        Canned::json(json!({"id": "d1", "nome": "Lamp", "online": true}))
    })]);

    let device = client(&endpoint).get_device("d1").unwrap().unwrap();
    assert_eq!(device.id.as_deref(), Some("d1"));
    assert_eq!(device.nome.as_deref(), Some("Lamp"));
    assert!(device.online);

    let seen = server.join().unwrap();
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].path, "/api/dispositivos/obter");
    assert!(seen[0].headers["content-type"].starts_with("application/json"));
    assert_eq!(seen[0].headers["accept"], "application/json");
    assert_eq!(seen[0].json(), json!("d1"));
}

#[test]
fn null_reply_is_absent_room() {
    let (endpoint, server) = serve(vec![handler(|_| Canned::json(Value::Null))]);

    let room = client(&endpoint).get_room("Garagem").unwrap();
    assert!(room.is_none());

    let seen = server.join().unwrap();
    assert_eq!(seen[0].path, "/api/comodos/obter");
    assert_eq!(seen[0].json(), json!("Garagem"));
}

#[test]
fn update_preserves_untouched_fields() {
    let stored = json!({
        "id": "d1",
        "nome": "Lampada Sala",
        "descricao": "Luz principal",
        "comodo": "Sala",
        "online": false,
        "tipo": "Lampada",
        "ligada": true,
        "intensidade": 70,
        "temperatura": 2700
    });
    let fetched = stored.clone();

    let (endpoint, server) = serve(vec![
        handler(move |_| Canned::json(fetched.clone())),
        // Echo the device half of the [id, device] pair back.
        handler(|request| Canned::json(request.json()[1].clone())),
    ]);

    let api = client(&endpoint);
    let mut device = api.get_device("d1").unwrap().unwrap();
    device.online = !device.online;
    let updated = api.update_device("d1", &device).unwrap().unwrap();

    assert!(updated.online);
    assert_eq!(
        Device {
            online: false,
            ..updated.clone()
        },
        serde_json::from_value::<Device>(stored.clone()).unwrap()
    );

    let seen = server.join().unwrap();
    assert_eq!(seen[1].path, "/api/dispositivos/atualizar");
    let sent = seen[1].json();
    assert_eq!(sent[0], json!("d1"));
    assert_eq!(sent[1]["online"], json!(true));
    for field in ["id", "nome", "descricao", "comodo", "tipo", "ligada", "intensidade", "temperatura"] {
        assert_eq!(sent[1][field], stored[field], "field {field}");
    }
}

#[test]
fn execute_action_posts_id_and_command_pair() {
    let (endpoint, server) = serve(vec![handler(|_| {
        Canned::json(json!({"id": "d1", "nome": "Lamp", "online": true, "ligada": true}))
    })]);

    let device = client(&endpoint).execute_action("d1", "ligar").unwrap().unwrap();
    assert_eq!(device.extra["ligada"], json!(true));

    let seen = server.join().unwrap();
    assert_eq!(seen[0].path, "/api/dispositivos/acao");
    assert_eq!(seen[0].json(), json!(["d1", "ligar"]));
}

#[test]
fn create_routine_sends_single_action_with_empty_parameters() {
    let (endpoint, server) = serve(vec![handler(|request| {
        let mut created = request.json();
        created["id"] = json!("r1");
        Canned::json(created)
    })]);

    let routine = Routine {
        nome: Some("Boa noite".into()),
        acoes: vec![Action::new("d1", "ligar")],
        ..Routine::default()
    };
    let created = client(&endpoint).create_routine(&routine).unwrap().unwrap();
    assert_eq!(created.id.as_deref(), Some("r1"));
    assert_eq!(created.nome.as_deref(), Some("Boa noite"));

    let seen = server.join().unwrap();
    assert_eq!(seen[0].path, "/api/rotinas/criar");
    assert_eq!(
        seen[0].json(),
        json!({
            "nome": "Boa noite",
            "acoes": [{"dispositivoId": "d1", "comando": "ligar", "parametros": {}}]
        })
    );
}

#[test]
fn text_reply_raises_unexpected_text() {
    let (endpoint, server) = serve(vec![handler(|_| Canned {
        status: 200,
        content_type: Some("text/plain"),
        body: b"Servidor em manutencao".to_vec(),
        declared_length: None,
    })]);

    let err = client(&endpoint).list_routines().unwrap_err();
    match &err {
        ClientError::UnexpectedText(text) => assert_eq!(text, "Servidor em manutencao"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "Servidor retornou texto em vez de JSON: Servidor em manutencao"
    );
    server.join().unwrap();
}

#[test]
fn binary_reply_raises_unexpected_binary() {
    let (endpoint, server) = serve(vec![handler(|_| Canned {
        status: 200,
        content_type: Some("application/octet-stream"),
        body: vec![0xAC, 0xED, 0x00, 0x05, 0x73, 0x72, 0xFF],
        declared_length: None,
    })]);

    let err = client(&endpoint).list_devices().unwrap_err();
    assert!(matches!(err, ClientError::UnexpectedBinary));
    server.join().unwrap();
}

#[test]
fn not_found_raises_http_error_with_body() {
    let (endpoint, server) = serve(vec![handler(|_| Canned {
        status: 404,
        content_type: Some("application/json; charset=UTF-8"),
        body: br#"{"erro":"Dispositivo nao encontrado: x","codigo":404}"#.to_vec(),
        declared_length: None,
    })]);

    let err = client(&endpoint).get_device("x").unwrap_err();
    match &err {
        ClientError::Http { status, body } => {
            assert_eq!(*status, 404);
            assert!(body.contains("Dispositivo nao encontrado: x"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "Erro HTTP 404: Dispositivo nao encontrado: x");
    server.join().unwrap();
}

#[test]
fn unreadable_error_body_uses_generic_message() {
    let (endpoint, server) = serve(vec![handler(|_| Canned {
        status: 500,
        content_type: Some("text/plain"),
        body: b"Err".to_vec(),
        declared_length: Some(100),
    })]);

    let err = client(&endpoint).list_devices().unwrap_err();
    match err {
        ClientError::Http { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "Erro HTTP 500");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    server.join().unwrap();
}

#[test]
fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let endpoint = Endpoint {
        host: "127.0.0.1".into(),
        port,
    };

    let err = client(&endpoint).list_devices().unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}
