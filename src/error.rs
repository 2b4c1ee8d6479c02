use thiserror::Error;

/// Errors raised by [`crate::api::RemoteClient`].
///
/// The shell catches every variant and prints it after an `[ERRO] ` marker,
/// so the `Display` text is what the operator reads.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with a status outside 2xx.
    #[error("Erro HTTP {status}: {}", server_message(.body))]
    Http { status: u16, body: String },

    /// The reply was declared as JSON but could not be parsed.
    #[error("Erro ao decodificar JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// The reply was not JSON but was readable text.
    #[error("Servidor retornou texto em vez de JSON: {0}")]
    UnexpectedText(String),

    /// The reply was neither JSON nor UTF-8 text.
    #[error(
        "Servidor retornou dados binarios em vez de JSON. Certifique-se de que o servidor \
         esta configurado para retornar JSON quando o header Accept: application/json e enviado."
    )]
    UnexpectedBinary,

    #[error("Falha de comunicacao com o servidor: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// The server wraps its failures as {"erro": "...", "codigo": N}.
fn server_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("erro").and_then(|erro| erro.as_str()).map(str::to_owned))
        .unwrap_or_else(|| body.to_string())
}
