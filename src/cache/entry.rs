//! Cache Entry Module
//!
//! A cached response lives in storage as two items: the serialized value
//! under its key, and the expiry timestamp under `key + ":ttl"`.

#[cfg(test)]
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::storage::Storage;

// == Constants ==
/// Suffix of the storage key holding an entry's expiry timestamp
pub const TTL_SUFFIX: &str = ":ttl";

/// TTL applied when neither the request nor the configuration sets one
pub const DEFAULT_TTL_HOURS: f64 = 1.0;

/// Milliseconds per TTL unit
pub const MS_PER_HOUR: u64 = 60 * 60 * 1000;

/// Returns the storage key of the TTL half for `key`.
pub fn ttl_key(key: &str) -> String {
    format!("{}{}", key, TTL_SUFFIX)
}

/// Absolute expiry for an entry written at `now_ms`.
pub fn expires_at(now_ms: u64, ttl_hours: f64) -> u64 {
    now_ms.saturating_add((ttl_hours * MS_PER_HOUR as f64).round() as u64)
}

// == Cache Entry ==
/// Snapshot of both halves of an entry as currently stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The serialized response, None = not stored
    pub value: Option<String>,
    /// Raw TTL record, None = no TTL written yet
    pub ttl: Option<String>,
}

impl CacheEntry {
    // == Load ==
    /// Reads both halves of `key` from `storage`.
    pub fn load(storage: &dyn Storage, key: &str) -> Self {
        Self {
            value: storage.get_item(key),
            ttl: storage.get_item(&ttl_key(key)),
        }
    }

    /// Parsed expiry timestamp, None when absent or unreadable.
    pub fn expires_at(&self) -> Option<u64> {
        self.ttl.as_deref().and_then(|raw| raw.trim().parse().ok())
    }

    // == Is Expired ==
    /// Checks if the TTL half has lapsed at `now_ms`.
    ///
    /// An absent TTL is never expired. A TTL record that cannot be parsed
    /// is treated as expired so the pair gets rewritten.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match (&self.ttl, self.expires_at()) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(_), Some(expires)) => expires < now_ms,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiry is recorded.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.expires_at()
            .map(|expires| expires.saturating_sub(now_ms))
    }
}

// == Clock ==
/// Source of the current time in Unix milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        current_timestamp_ms()
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(now_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
