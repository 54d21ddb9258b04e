//! Cache Transport
//!
//! Overrides the real transport when storage already holds a fresh response
//! for the request, answering it synchronously without any network I/O.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{purge, CacheContext};
use crate::models::{CacheOptions, Completion, Payload, Request, ResponseKind};
use crate::transport::{CompleteCallback, TransportHandle};

// == Cache Transport ==
#[derive(Clone)]
pub struct CacheTransport {
    ctx: Arc<CacheContext>,
}

impl CacheTransport {
    pub fn new(ctx: Arc<CacheContext>) -> Self {
        Self { ctx }
    }

    // == Handler ==
    /// Returns a synthetic handle replaying the stored payload, or None to
    /// let the request fall through to the real transport.
    pub fn handler(
        &self,
        request: &Request,
        options: &CacheOptions,
    ) -> Option<SyntheticResponse> {
        let resolved = self.ctx.resolve(request, options)?;
        let kind = &request.response_kind;

        let raw = match resolved.storage.get_item(&resolved.key) {
            Some(raw) => raw,
            None => {
                self.ctx.stats().record_miss();
                return None;
            }
        };

        match Payload::from_stored(&raw, kind) {
            Ok(payload) => {
                debug!(key = %resolved.key, "Serving response from cache");
                self.ctx.stats().record_hit();
                Some(SyntheticResponse::new(kind.clone(), payload))
            }
            Err(e) => {
                warn!(key = %resolved.key, error = %e, "Discarding unreadable cached value");
                purge(resolved.storage.as_ref(), &resolved.key);
                self.ctx.stats().record_purge();
                self.ctx.stats().record_miss();
                None
            }
        }
    }
}

// == Synthetic Response ==
/// Transport handle that completes with a cached payload.
#[derive(Debug, Clone)]
pub struct SyntheticResponse {
    kind: ResponseKind,
    payload: Payload,
}

impl SyntheticResponse {
    pub fn new(kind: ResponseKind, payload: Payload) -> Self {
        Self { kind, payload }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl TransportHandle for SyntheticResponse {
    fn send(&mut self, _request: &Request, complete: CompleteCallback) {
        complete(Completion::success(&self.kind, self.payload.clone()));
    }

    fn abort(&mut self) {
        debug!("Aborted transport for cached response");
    }
}
