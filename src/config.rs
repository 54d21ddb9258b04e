//! Configuration Module
//!
//! Handles loading the cache defaults from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::{DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL_HOURS};
use crate::storage::DEFAULT_QUOTA_BYTES;

/// Query parameters stripped from URLs before they become part of a cache key.
pub const DEFAULT_STRIP_PARAMS: &[&str] = &["_", "callback"];

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL in hours applied when a request does not set its own
    pub default_ttl_hours: f64,
    /// Location of the default persistent store, None = platform cache dir
    pub storage_path: Option<PathBuf>,
    /// Maximum bytes (keys + values) the default store may hold
    pub quota_bytes: usize,
    /// Query parameters removed during key derivation
    pub strip_params: Vec<String>,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LOCAL_CACHE_TTL_HOURS` - Default TTL in hours (default: 1)
    /// - `LOCAL_CACHE_PATH` - Default store file (default: platform cache dir)
    /// - `LOCAL_CACHE_QUOTA_BYTES` - Default store quota (default: 5 MiB)
    /// - `LOCAL_CACHE_STRIP_PARAMS` - Comma separated query params (default: `_,callback`)
    /// - `LOCAL_CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl_hours: env::var("LOCAL_CACHE_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|h| h.is_finite() && *h > 0.0)
                .unwrap_or(defaults.default_ttl_hours),
            storage_path: env::var("LOCAL_CACHE_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            quota_bytes: env::var("LOCAL_CACHE_QUOTA_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.quota_bytes),
            strip_params: env::var("LOCAL_CACHE_STRIP_PARAMS")
                .ok()
                .map(|v| parse_list(&v))
                .unwrap_or(defaults.strip_params),
            sweep_interval: env::var("LOCAL_CACHE_SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.sweep_interval),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_hours: DEFAULT_TTL_HOURS,
            storage_path: None,
            quota_bytes: DEFAULT_QUOTA_BYTES,
            strip_params: DEFAULT_STRIP_PARAMS.iter().map(|p| p.to_string()).collect(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL.as_secs(),
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
