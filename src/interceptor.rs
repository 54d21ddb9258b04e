//! Request Interceptor
//!
//! Runs before a cache-enabled request is dispatched. It evaluates the
//! stored entry, purges what may not be replayed and, when the response
//! will have to come from the network, wraps the caller's success handler so
//! the response is persisted on the way back.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{evaluate_freshness, purge, write_ttl_if_needed, CacheContext, Freshness};
use crate::error::StorageError;
use crate::models::{CacheOptions, Payload, Request, ResponseKind};
use crate::storage::SharedStorage;

/// Receives the payload of a successful request.
pub type SuccessHandler = Box<dyn FnOnce(Payload) + Send>;

// == Interceptor ==
#[derive(Clone)]
pub struct Interceptor {
    ctx: Arc<CacheContext>,
}

impl Interceptor {
    pub fn new(ctx: Arc<CacheContext>) -> Self {
        Self { ctx }
    }

    // == Prefilter ==
    /// Prepares the write side of the cache for `request`.
    ///
    /// Returns the success handler the dispatch should use: `success`
    /// untouched when caching is disabled or a fresh entry exists, otherwise
    /// a persisting wrapper around it. Never short-circuits the request.
    pub fn prefilter(
        &self,
        request: &Request,
        options: &CacheOptions,
        success: Option<SuccessHandler>,
    ) -> Option<SuccessHandler> {
        let resolved = match self.ctx.resolve(request, options) {
            Some(resolved) => resolved,
            None => return success,
        };
        let (key, storage) = (resolved.key, resolved.storage);
        let now = self.ctx.now_ms();

        let mut freshness =
            evaluate_freshness(storage.as_ref(), &key, options.is_valid.as_ref(), now);
        if freshness == Freshness::Expired {
            self.ctx.stats().record_purge();
        }

        let kind = &request.response_kind;
        if freshness == Freshness::Fresh && !replayable(&storage, &key, kind) {
            warn!(key = %key, kind = kind.as_str(), "Cached value is unreadable, discarding");
            purge(storage.as_ref(), &key);
            self.ctx.stats().record_purge();
            freshness = Freshness::Absent;
        }

        if freshness == Freshness::Fresh {
            debug!(key = %key, "Fresh cache entry, leaving dispatch to the cache transport");
            return success;
        }

        let ttl_hours = self.ctx.ttl_hours(options);
        if let Err(e) = write_ttl_if_needed(storage.as_ref(), &key, freshness, ttl_hours, now) {
            // Without its TTL half the value must not be written either
            warn!(key = %key, error = %e, "Failed to record cache TTL, request will not be cached");
            return success;
        }

        debug!(key = %key, ?freshness, ttl_hours, "Cache miss, persisting response on success");
        Some(persisting(
            storage,
            key,
            kind.clone(),
            Arc::clone(&self.ctx),
            success,
        ))
    }
}

fn replayable(storage: &SharedStorage, key: &str, kind: &ResponseKind) -> bool {
    storage
        .get_item(key)
        .is_some_and(|raw| Payload::from_stored(&raw, kind).is_ok())
}

// == Persisting Wrapper ==
/// Wraps `original` so the payload is stored under `key` before being
/// forwarded.
///
/// A failed write removes both halves of the entry and is only logged; the
/// original handler always receives the payload.
pub fn persisting(
    storage: SharedStorage,
    key: String,
    kind: ResponseKind,
    ctx: Arc<CacheContext>,
    original: Option<SuccessHandler>,
) -> SuccessHandler {
    Box::new(move |payload: Payload| {
        if payload.is_empty() {
            debug!(key = %key, "Response has no body, not cached");
        } else {
            persist(&storage, &key, &kind, &ctx, &payload);
        }

        if let Some(handler) = original {
            handler(payload);
        }
    })
}

fn persist(
    storage: &SharedStorage,
    key: &str,
    kind: &ResponseKind,
    ctx: &CacheContext,
    payload: &Payload,
) {
    match store_payload(storage, key, kind, payload) {
        Ok(()) => {
            ctx.stats().record_write();
            debug!(key = %key, "Response cached");
        }
        Err(e) => {
            purge(storage.as_ref(), key);
            ctx.stats().record_write_failure();
            warn!(key = %key, error = %e, "Cache write failed, entry rolled back");
        }
    }
}

fn store_payload(
    storage: &SharedStorage,
    key: &str,
    kind: &ResponseKind,
    payload: &Payload,
) -> Result<(), StorageError> {
    let raw = payload.to_stored(kind)?;
    storage.set_item(key, &raw)
}
