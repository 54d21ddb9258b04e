//! Cache Module
//!
//! Key derivation, freshness evaluation and the shared state the request
//! interceptor and the transport override work from.

mod context;
mod entry;
mod freshness;
mod key;
mod stats;


// Re-export public types
pub use context::{CacheContext, Resolved, DEFAULT_SWEEP_INTERVAL};
pub use entry::{
    current_timestamp_ms, expires_at, ttl_key, CacheEntry, Clock, SystemClock, DEFAULT_TTL_HOURS,
    MS_PER_HOUR, TTL_SUFFIX,
};

#[cfg(test)]
pub use entry::ManualClock;
pub use freshness::{evaluate_freshness, purge, sweep_expired, write_ttl_if_needed, Freshness};
pub use key::{derive_key, KeyPolicy};
pub use stats::{CacheStats, StatsSnapshot};
