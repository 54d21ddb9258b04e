//! Storage Module
//!
//! The key/value collaborator the cache persists entries into, plus the
//! in-memory and file-backed implementations.

mod file;
mod memory;

#[cfg(test)]
pub(crate) mod testing;

use std::collections::HashMap;
use std::sync::Arc;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::{Result, StorageError};

// == Public Constants ==
/// Default capacity of a store, counted over key and value bytes
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024; // 5 MiB

// == Storage Trait ==
/// Minimal string key/value store.
///
/// Every call is atomic on its own; nothing groups several calls into a
/// transaction, so callers compensate for partial writes themselves.
pub trait Storage: Send + Sync {
    /// Returns the value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// Fails when the store is out of capacity or cannot persist the write.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str);

    /// Lists stored keys, for stores that can enumerate them.
    fn keys(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Storage handle shared between the cache components.
pub type SharedStorage = Arc<dyn Storage>;

// == Quota Accounting ==
/// Bytes an entry occupies against a quota.
pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// Checks that replacing `key` with `value` keeps `entries` within `quota`.
pub(crate) fn check_quota(
    entries: &HashMap<String, String>,
    used: usize,
    quota: Option<usize>,
    key: &str,
    value: &str,
) -> Result<usize> {
    let released = entries.get(key).map(|old| entry_size(key, old)).unwrap_or(0);
    let needed = used - released + entry_size(key, value);

    match quota {
        Some(quota) if needed > quota => Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            needed,
            quota,
        }),
        _ => Ok(needed),
    }
}
