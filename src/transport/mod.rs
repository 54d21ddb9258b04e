//! Transport Module
//!
//! The dispatch-time half of the request pipeline. A request is sent either
//! through a real transport or, when a fresh entry exists, through a
//! synthetic handle that replays the cached payload. Both expose the same
//! `send`/`abort` capability.

mod cached;
mod http;

pub use cached::{CacheTransport, SyntheticResponse};
pub use http::{HttpTransport, PARSE_ERROR};

use crate::models::{Completion, Request};

/// Receives the completion of a dispatched request.
pub type CompleteCallback = Box<dyn FnOnce(Completion) + Send>;

// == Transport Traits ==
/// One in-flight (or ready-to-send) request.
pub trait TransportHandle: Send {
    /// Sends `request`; `complete` fires exactly once unless the send is aborted.
    fn send(&mut self, request: &Request, complete: CompleteCallback);

    /// Cancels the request if it is still in flight.
    fn abort(&mut self);
}

/// Factory of transport handles.
pub trait Transport: Send + Sync {
    fn open(&self, request: &Request) -> Box<dyn TransportHandle>;
}

// == Dispatch ==
/// How a request is being delivered, chosen once per request.
pub enum Dispatch {
    /// Through the real transport
    RealDispatch(Box<dyn TransportHandle>),
    /// Replayed from storage
    SyntheticHit(SyntheticResponse),
}

impl Dispatch {
    pub fn send(&mut self, request: &Request, complete: CompleteCallback) {
        match self {
            Dispatch::RealDispatch(handle) => handle.send(request, complete),
            Dispatch::SyntheticHit(hit) => hit.send(request, complete),
        }
    }

    pub fn cancel(&mut self) {
        match self {
            Dispatch::RealDispatch(handle) => handle.abort(),
            Dispatch::SyntheticHit(hit) => hit.abort(),
        }
    }

    pub fn is_cache_hit(&self) -> bool {
        matches!(self, Dispatch::SyntheticHit(_))
    }
}
