//! Storage doubles shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::cache::TTL_SUFFIX;
use crate::error::{Result, StorageError};
use crate::storage::{MemoryStorage, Storage};

/// Counts every call made against an inner memory store.
#[derive(Debug, Default)]
pub(crate) struct CountingStorage {
    pub inner: MemoryStorage,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    pub removes: AtomicUsize,
}

impl CountingStorage {
    pub fn total_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
            + self.sets.load(Ordering::SeqCst)
            + self.removes.load(Ordering::SeqCst)
    }
}

impl Storage for CountingStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove_item(key)
    }
}

/// Accepts TTL records but rejects every value write, like a store that is
/// just about full.
#[derive(Debug, Default)]
pub(crate) struct FullStorage {
    pub inner: MemoryStorage,
}

impl Storage for FullStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if key.ends_with(TTL_SUFFIX) {
            return self.inner.set_item(key, value);
        }
        Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            needed: key.len() + value.len(),
            quota: 0,
        })
    }

    fn remove_item(&self, key: &str) {
        self.inner.remove_item(key)
    }
}
