//! Request descriptor
//!
//! The outgoing request as seen by the cache: its identity (URL, method,
//! body) and the kind of response the caller expects back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// == Method ==
/// HTTP method of an outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    /// Returns the upper-case wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            other => Err(format!("Unsupported method: {}", other)),
        }
    }
}

// == Response Kind ==
/// Declared type of the response body.
///
/// Decides whether payloads go through JSON (de)serialization on their way
/// in and out of storage, and under which name a completion carries them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ResponseKind {
    /// Any data type starting with `json` (`json`, `jsonp`, ...)
    Json,
    /// Plain text
    #[default]
    Text,
    /// Anything else, stored and replayed as raw text
    Other(String),
}

impl ResponseKind {
    /// Resolves a data type name into a response kind.
    pub fn from_data_type(data_type: &str) -> Self {
        let normalized = data_type.trim().to_ascii_lowercase();
        if normalized.starts_with("json") {
            ResponseKind::Json
        } else if normalized == "text" {
            ResponseKind::Text
        } else {
            ResponseKind::Other(normalized)
        }
    }

    /// True for the JSON family.
    pub fn is_json(&self) -> bool {
        matches!(self, ResponseKind::Json)
    }

    /// Name under which completions carry a payload of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            ResponseKind::Json => "json",
            ResponseKind::Text => "text",
            ResponseKind::Other(name) => name,
        }
    }
}

// == Request ==
/// An outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Target URL, possibly carrying transport-injected query tokens
    pub url: String,
    /// HTTP method
    pub method: Method,
    /// Serialized request body
    pub body: Option<String>,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
    /// Expected response type
    pub response_kind: ResponseKind,
}

impl Request {
    /// Creates a request with no body and a text response.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            body: None,
            headers: Vec::new(),
            response_kind: ResponseKind::default(),
        }
    }

    /// Shorthand for a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Shorthand for a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the expected response type.
    pub fn expecting(mut self, kind: ResponseKind) -> Self {
        self.response_kind = kind;
        self
    }
}
