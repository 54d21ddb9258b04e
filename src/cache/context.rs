//! Cache Context Module
//!
//! State shared by the interceptor and the transport override. Both resolve
//! a request's key and storage through [`CacheContext::resolve`], so they
//! always agree on where an entry lives.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::entry::{Clock, SystemClock, DEFAULT_TTL_HOURS};
use crate::cache::key::KeyPolicy;
use crate::cache::stats::CacheStats;
use crate::config::CacheConfig;
use crate::models::{CacheMode, CacheOptions, Request};
use crate::storage::{FileStorage, SharedStorage};

/// Key and storage a cache-enabled request resolves to.
#[derive(Clone)]
pub struct Resolved {
    pub key: String,
    pub storage: SharedStorage,
}

// == Cache Context ==
pub struct CacheContext {
    default_storage: SharedStorage,
    key_policy: KeyPolicy,
    clock: Arc<dyn Clock>,
    default_ttl_hours: f64,
    sweep_interval: Duration,
    stats: CacheStats,
}

/// Sweep period used when the configuration does not set one
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

impl CacheContext {
    // == Constructor ==
    /// Creates a context around the storage selected by `CacheMode::DefaultStorage`.
    pub fn new(default_storage: SharedStorage) -> Self {
        Self {
            default_storage,
            key_policy: KeyPolicy::default(),
            clock: Arc::new(SystemClock),
            default_ttl_hours: DEFAULT_TTL_HOURS,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            stats: CacheStats::new(),
        }
    }

    /// Creates a context from configuration, opening the default file store.
    pub fn from_config(config: &CacheConfig) -> Self {
        let path = config
            .storage_path
            .clone()
            .unwrap_or_else(FileStorage::default_path);
        let storage = FileStorage::open(path, Some(config.quota_bytes));

        Self::new(Arc::new(storage))
            .with_key_policy(KeyPolicy::new(config.strip_params.iter().cloned()))
            .with_default_ttl_hours(config.default_ttl_hours)
            .with_sweep_interval(Duration::from_secs(config.sweep_interval))
    }

    pub fn with_key_policy(mut self, key_policy: KeyPolicy) -> Self {
        self.key_policy = key_policy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Ignored unless positive and finite.
    pub fn with_default_ttl_hours(mut self, hours: f64) -> Self {
        if hours.is_finite() && hours > 0.0 {
            self.default_ttl_hours = hours;
        }
        self
    }

    /// Ignored when zero.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.sweep_interval = interval;
        }
        self
    }

    // == Resolve ==
    /// Returns the key and storage for `request`, or None when caching is off.
    pub fn resolve(&self, request: &Request, options: &CacheOptions) -> Option<Resolved> {
        let storage = match &options.mode {
            CacheMode::Disabled => return None,
            CacheMode::DefaultStorage => Arc::clone(&self.default_storage),
            CacheMode::Custom(storage) => Arc::clone(storage),
        };

        Some(Resolved {
            key: self.key_policy.derive(request, options.key.as_deref()),
            storage,
        })
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn ttl_hours(&self, options: &CacheOptions) -> f64 {
        options.effective_ttl_hours(self.default_ttl_hours)
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn default_storage(&self) -> &SharedStorage {
        &self.default_storage
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// How often the default storage is swept for expired entries.
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }
}
