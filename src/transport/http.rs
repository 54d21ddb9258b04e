//! HTTP Transport
//!
//! Real network transport built on reqwest. Each send runs on its own tokio
//! task and reports back through the completion callback. Outside a tokio
//! runtime the send completes at once with a transport failure.

use std::collections::HashMap;

use tokio::task::JoinHandle;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::models::{Completion, Method, Payload, Request, ResponseKind};
use crate::transport::{CompleteCallback, Transport, TransportHandle};

/// Status text of a completion whose body did not match its response kind.
pub const PARSE_ERROR: &str = "parsererror";

// == HTTP Transport ==
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a preconfigured client (timeouts, proxies, default headers).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn open(&self, _request: &Request) -> Box<dyn TransportHandle> {
        Box::new(HttpHandle {
            client: self.client.clone(),
            task: None,
        })
    }
}

// == HTTP Handle ==
struct HttpHandle {
    client: reqwest::Client,
    task: Option<JoinHandle<()>>,
}

impl TransportHandle for HttpHandle {
    fn send(&mut self, request: &Request, complete: CompleteCallback) {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(url = %request.url, error = %e, "No tokio runtime for HTTP transport");
                complete(Completion::failed(format!("No async runtime available: {}", e)));
                return;
            }
        };

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let kind = request.response_kind.clone();
        let url = request.url.clone();
        self.task = Some(runtime.spawn(async move {
            let completion = match builder.send().await {
                Ok(response) => completion_from(response, &kind).await,
                Err(e) => {
                    debug!(url = %url, error = %e, "HTTP request failed");
                    Completion::failed(e.to_string())
                }
            };
            complete(completion);
        }));
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Aborted HTTP transport");
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

async fn completion_from(response: reqwest::Response, kind: &ResponseKind) -> Completion {
    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value.to_str().unwrap_or_default()))
        .collect::<Vec<_>>()
        .join("\n");

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            return Completion {
                status: status.as_u16(),
                headers,
                ..Completion::failed(e.to_string())
            }
        }
    };

    let mut completion = Completion {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        responses: HashMap::new(),
        headers,
    };

    match payload_for(completion.status, &body, kind) {
        Some(payload) => {
            completion.responses.insert(kind.as_str().to_string(), payload);
        }
        None if completion.is_success() => {
            completion.status_text = PARSE_ERROR.to_string();
        }
        None => {}
    }
    completion
}

/// Decodes a response body, `None` when it does not match `kind`.
fn payload_for(status: u16, body: &str, kind: &ResponseKind) -> Option<Payload> {
    if matches!(status, 204 | 304) && body.is_empty() {
        return Some(Payload::Empty);
    }
    Payload::from_stored(body, kind).ok()
}
