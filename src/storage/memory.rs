//! Memory Storage Module
//!
//! In-process key/value store with an optional byte quota.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::Result;
use crate::storage::{check_quota, entry_size, Storage};

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, String>,
    used: usize,
}

// == Memory Storage ==
/// Thread-safe in-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: RwLock<Inner>,
    /// Maximum bytes (keys + values), None = unbounded
    quota: Option<usize>,
}

impl MemoryStorage {
    // == Constructor ==
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes past `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            quota: Some(quota),
        }
    }

    // == Length ==
    /// Returns the number of stored items.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Returns the bytes currently counted against the quota.
    pub fn used_bytes(&self) -> usize {
        self.inner.read().used
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.inner.read().entries.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.write();
        let used = check_quota(&inner.entries, inner.used, self.quota, key, value)?;
        inner.entries.insert(key.to_string(), value.to_string());
        inner.used = used;
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        let mut inner = self.inner.write();
        if let Some(old) = inner.entries.remove(key) {
            inner.used -= entry_size(key, &old);
        }
    }

    fn keys(&self) -> Vec<String> {
        self.inner.read().entries.keys().cloned().collect()
    }
}
