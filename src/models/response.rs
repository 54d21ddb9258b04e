//! Response models
//!
//! Payloads handed to success handlers and the completion record a
//! transport delivers when a request finishes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::ResponseKind;

// == Payload ==
/// A response body, already converted to the declared response kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// Parsed JSON document
    Json(Value),
    /// Raw text body
    Text(String),
    /// No body at all (204, bodyless 304); never stored
    Empty,
}

impl Payload {
    /// Encodes the payload as the string stored for `kind`.
    ///
    /// JSON-family kinds are always JSON encoded; other kinds store text as-is.
    pub fn to_stored(&self, kind: &ResponseKind) -> serde_json::Result<String> {
        match (kind.is_json(), self) {
            (true, Payload::Json(value)) => serde_json::to_string(value),
            (true, Payload::Text(text)) => serde_json::to_string(text),
            (false, Payload::Text(text)) => Ok(text.clone()),
            (false, Payload::Json(value)) => serde_json::to_string(value),
            (_, Payload::Empty) => Ok(String::new()),
        }
    }

    /// Decodes a stored string back into a payload of `kind`.
    pub fn from_stored(raw: &str, kind: &ResponseKind) -> serde_json::Result<Self> {
        if kind.is_json() {
            serde_json::from_str(raw).map(Payload::Json)
        } else {
            Ok(Payload::Text(raw.to_string()))
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) | Payload::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }
}

// == Completion ==
/// What a transport reports when a request finishes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Completion {
    /// HTTP status, 0 when the remote end was never reached
    pub status: u16,
    /// Status text (`success`, a reason phrase, or an error description)
    pub status_text: String,
    /// Payloads keyed by response kind name
    pub responses: HashMap<String, Payload>,
    /// Raw response headers, one `name: value` per line
    pub headers: String,
}

impl Completion {
    /// A `200 success` completion carrying `payload` under `kind`.
    pub fn success(kind: &ResponseKind, payload: Payload) -> Self {
        let mut responses = HashMap::new();
        responses.insert(kind.as_str().to_string(), payload);
        Self {
            status: 200,
            status_text: "success".to_string(),
            responses,
            headers: String::new(),
        }
    }

    /// A completion for a request that never produced a response.
    pub fn failed(status_text: impl Into<String>) -> Self {
        Self {
            status: 0,
            status_text: status_text.into(),
            ..Self::default()
        }
    }

    /// 2xx or 304.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) || self.status == 304
    }

    /// Removes and returns the payload stored for `kind`.
    pub fn take_payload(&mut self, kind: &ResponseKind) -> Option<Payload> {
        self.responses.remove(kind.as_str())
    }
}
