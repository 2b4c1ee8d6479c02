// Payloads exchanged with the smart-home server. Field names mirror the
// server's JSON (Portuguese, camelCase). Every field is optional on the way
// in because the server owns the schema; the shell renders a placeholder for
// anything missing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder rendered for fields the server did not send.
pub const MISSING: &str = "N/A";

/// A controllable IoT unit (lamp, thermostat, sensor, lock, camera...).
///
/// Fields the client does not know about (the subtype attributes such as
/// `ligada` or `intensidade`) are kept in `extra` so that a device fetched
/// with `get_device` can be sent back by `update_device` unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Device {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
    #[serde(default)]
    pub online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comodo: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One step of a routine.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Action {
    #[serde(rename = "dispositivoId", default)]
    pub device_id: Option<String>,
    #[serde(rename = "comando", default)]
    pub command: Option<String>,
    #[serde(rename = "parametros", default)]
    pub parameters: Map<String, Value>,
}

impl Action {
    pub fn new(device_id: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            device_id: Some(device_id.into()),
            command: Some(command.into()),
            parameters: Map::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Routine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub acoes: Vec<Action>,
    /// ISO local date-time, e.g. `2026-10-16T07:30`.
    #[serde(
        rename = "horarioInicio",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Alert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mensagem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comodo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Room {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dispositivos: Vec<Device>,
}

/// Reads an optional text field, falling back to [`MISSING`].
pub fn or_missing(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or(MISSING)
}

/// Renders a boolean the way the shell shows it.
pub fn yes_no(value: bool) -> &'static str {
    if value {
        "Sim"
    } else {
        "Nao"
    }
}

// The server sends `null` for lists it never initialised.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
