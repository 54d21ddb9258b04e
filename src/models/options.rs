//! Per-request cache options
//!
//! Caching is opt-in: a request is only looked up and persisted when its
//! options enable a storage.

use std::fmt;
use std::sync::Arc;

use crate::storage::SharedStorage;

/// Externally supplied invalidation hook; `false` forces a cache miss.
pub type Validator = Arc<dyn Fn() -> bool + Send + Sync>;

// == Cache Mode ==
/// Which storage, if any, a request is cached in.
#[derive(Clone, Default)]
pub enum CacheMode {
    /// No caching, the request passes through untouched
    #[default]
    Disabled,
    /// Use the context's default persistent storage
    DefaultStorage,
    /// Use the given storage
    Custom(SharedStorage),
}

impl fmt::Debug for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheMode::Disabled => f.write_str("Disabled"),
            CacheMode::DefaultStorage => f.write_str("DefaultStorage"),
            CacheMode::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// == Cache Options ==
#[derive(Clone, Default)]
pub struct CacheOptions {
    /// Storage selection
    pub mode: CacheMode,
    /// Freshness window in hours
    pub ttl_hours: Option<f64>,
    /// Explicit cache key, overrides derivation
    pub key: Option<String>,
    /// Validity hook checked before the TTL
    pub is_valid: Option<Validator>,
}

impl CacheOptions {
    /// Options that leave the request uncached.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Options that cache in the default storage.
    pub fn enabled() -> Self {
        Self {
            mode: CacheMode::DefaultStorage,
            ..Self::default()
        }
    }

    /// Options that cache in `storage`.
    pub fn with_storage(storage: SharedStorage) -> Self {
        Self {
            mode: CacheMode::Custom(storage),
            ..Self::default()
        }
    }

    pub fn ttl_hours(mut self, hours: f64) -> Self {
        self.ttl_hours = Some(hours);
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn validity_check<F>(mut self, check: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.is_valid = Some(Arc::new(check));
        self
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self.mode, CacheMode::Disabled)
    }

    /// TTL to apply, falling back to `default` for unset or unusable values.
    pub fn effective_ttl_hours(&self, default: f64) -> f64 {
        self.ttl_hours
            .filter(|h| h.is_finite() && *h > 0.0)
            .unwrap_or(default)
    }
}

impl fmt::Debug for CacheOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheOptions")
            .field("mode", &self.mode)
            .field("ttl_hours", &self.ttl_hours)
            .field("key", &self.key)
            .field("is_valid", &self.is_valid.as_ref().map(|_| ".."))
            .finish()
    }
}
