//! W3C WebDriver wire format helpers.

use serde::Deserialize;
use serde_json::{json, Value};
use shelfcheck_runner::LookupError;

/// Key under which web element references are serialized.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Enter key in the WebDriver key code table.
pub const ENTER_KEY: &str = "\u{E007}";

/// Script used to empty an input field.
pub const CLEAR_SCRIPT: &str = "arguments[0].value = '';";

#[derive(Debug, Deserialize)]
struct NewSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

/// Body of a failed command: `{"value": {"error": ..., "message": ...}}`.
#[derive(Debug, Default, Deserialize)]
struct WireError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

/// Extract the session id from a `POST /session` value.
pub fn session_id(value: &Value) -> Result<String, LookupError> {
    NewSession::deserialize(value)
        .map(|s| s.session_id)
        .map_err(|e| LookupError::Session(format!("malformed new session response: {e}")))
}

/// Extract element ids from a `POST /session/{id}/elements` value.
pub fn element_ids(value: &Value) -> Result<Vec<String>, LookupError> {
    let elements = value
        .as_array()
        .ok_or_else(|| LookupError::Protocol("expected an array of elements".to_string()))?;

    elements
        .iter()
        .map(|element| {
            element
                .get(ELEMENT_KEY)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| LookupError::Protocol("element reference without id".to_string()))
        })
        .collect()
}

/// Serialize an element reference for use as a script argument.
pub fn element_ref(element_id: &str) -> Value {
    json!({ ELEMENT_KEY: element_id })
}

/// Map a failed command onto a lookup error.
pub fn error_from_payload(status: u16, payload: &Value) -> LookupError {
    let wire = payload
        .get("value")
        .and_then(|v| WireError::deserialize(v).ok())
        .unwrap_or_default();

    let detail = if wire.message.is_empty() {
        format!("HTTP {status}: {}", wire.error)
    } else {
        format!("{}: {}", wire.error, wire.message)
    };

    match wire.error.as_str() {
        "stale element reference" => LookupError::StaleReference(detail),
        "timeout" | "script timeout" => LookupError::Timeout(detail),
        "session not created" | "invalid session id" => LookupError::Session(detail),
        _ => LookupError::Protocol(detail),
    }
}
