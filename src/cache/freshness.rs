//! Freshness Module
//!
//! Decides whether a stored entry may be replayed, purging it when it may
//! not, and owns the rule for when a new TTL is written.

use tracing::debug;

use crate::cache::entry::{expires_at, ttl_key, CacheEntry, TTL_SUFFIX};
use crate::error::Result;
use crate::models::Validator;
use crate::storage::Storage;

// == Freshness ==
/// Outcome of evaluating an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// A usable value is stored
    Fresh,
    /// The TTL had lapsed; both halves were purged
    Expired,
    /// No usable value is stored
    Absent,
}

// == Evaluate ==
/// Evaluates `key` at `now_ms`, purging whatever must not be replayed.
///
/// Order matters: the validity hook runs first and only drops the value
/// half, the TTL check then drops both halves once the timestamp has passed.
pub fn evaluate_freshness(
    storage: &dyn Storage,
    key: &str,
    validator: Option<&Validator>,
    now_ms: u64,
) -> Freshness {
    if let Some(is_valid) = validator {
        if !is_valid() {
            debug!(key = %key, "Validity check failed, dropping cached value");
            storage.remove_item(key);
        }
    }

    let ttl = CacheEntry {
        value: None,
        ttl: storage.get_item(&ttl_key(key)),
    };
    if ttl.is_expired(now_ms) {
        debug!(key = %key, "Cache entry expired");
        purge(storage, key);
        return Freshness::Expired;
    }

    if storage.get_item(key).is_some() {
        debug!(key = %key, ttl_remaining_ms = ?ttl.ttl_remaining_ms(now_ms), "Cache entry fresh");
        Freshness::Fresh
    } else {
        Freshness::Absent
    }
}

// == TTL Write Policy ==
/// Writes `now + ttl_hours` as the TTL of `key` unless a live TTL exists.
///
/// Returns whether a TTL was written.
pub fn write_ttl_if_needed(
    storage: &dyn Storage,
    key: &str,
    freshness: Freshness,
    ttl_hours: f64,
    now_ms: u64,
) -> Result<bool> {
    let ttl_key = ttl_key(key);
    if freshness != Freshness::Expired && storage.get_item(&ttl_key).is_some() {
        return Ok(false);
    }

    storage.set_item(&ttl_key, &expires_at(now_ms, ttl_hours).to_string())?;
    Ok(true)
}

// == Purge ==
/// Removes both halves of `key`.
pub fn purge(storage: &dyn Storage, key: &str) {
    storage.remove_item(key);
    storage.remove_item(&ttl_key(key));
}

// == Sweep ==
/// Purges every entry whose TTL has lapsed at `now_ms`.
///
/// Only reaches storages that enumerate their keys. Returns the number of
/// entries removed.
pub fn sweep_expired(storage: &dyn Storage, now_ms: u64) -> usize {
    let expired: Vec<String> = storage
        .keys()
        .into_iter()
        .filter_map(|k| k.strip_suffix(TTL_SUFFIX).map(str::to_string))
        .filter(|key| CacheEntry::load(storage, key).is_expired(now_ms))
        .collect();

    for key in &expired {
        purge(storage, key);
    }
    expired.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    const NOW: u64 = 1_700_000_000_000;

    fn seeded(expires: u64) -> MemoryStorage {
        let storage = MemoryStorage::new();
        storage.set_item("k", "payload").unwrap();
        storage.set_item("k:ttl", &expires.to_string()).unwrap();
        storage
    }

    #[test]
    fn test_fresh_entry() {
        let storage = seeded(NOW + 1);
        assert_eq!(evaluate_freshness(&storage, "k", None, NOW), Freshness::Fresh);
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn test_absent_entry() {
        let storage = MemoryStorage::new();
        assert_eq!(evaluate_freshness(&storage, "k", None, NOW), Freshness::Absent);
    }

    #[test]
    fn test_value_without_ttl_is_fresh() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "payload").unwrap();
        assert_eq!(evaluate_freshness(&storage, "k", None, NOW), Freshness::Fresh);
    }

    #[test]
    fn test_expired_entry_purges_both_halves() {
        let storage = seeded(NOW - 1);
        assert_eq!(evaluate_freshness(&storage, "k", None, NOW), Freshness::Expired);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_expired_ttl_without_value() {
        let storage = MemoryStorage::new();
        storage.set_item("k:ttl", &(NOW - 1).to_string()).unwrap();
        assert_eq!(evaluate_freshness(&storage, "k", None, NOW), Freshness::Expired);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_failed_validity_drops_value_keeps_live_ttl() {
        let storage = seeded(NOW + 1000);
        let validator: Validator = Arc::new(|| false);

        let freshness = evaluate_freshness(&storage, "k", Some(&validator), NOW);

        assert_eq!(freshness, Freshness::Absent);
        assert!(storage.get_item("k").is_none());
        assert!(storage.get_item("k:ttl").is_some());
    }

    #[test]
    fn test_passing_validity_keeps_entry() {
        let storage = seeded(NOW + 1000);
        let validator: Validator = Arc::new(|| true);
        assert_eq!(
            evaluate_freshness(&storage, "k", Some(&validator), NOW),
            Freshness::Fresh
        );
    }

    #[test]
    fn test_ttl_written_when_missing() {
        let storage = MemoryStorage::new();
        let written = write_ttl_if_needed(&storage, "k", Freshness::Absent, 2.0, NOW).unwrap();
        assert!(written);
        assert_eq!(
            storage.get_item("k:ttl"),
            Some((NOW + 2 * 3_600_000).to_string())
        );
    }

    #[test]
    fn test_live_ttl_not_overwritten() {
        let storage = MemoryStorage::new();
        storage.set_item("k:ttl", "42").unwrap();
        let written = write_ttl_if_needed(&storage, "k", Freshness::Absent, 1.0, NOW).unwrap();
        assert!(!written);
        assert_eq!(storage.get_item("k:ttl").as_deref(), Some("42"));
    }

    #[test]
    fn test_ttl_rewritten_after_expiry() {
        let storage = MemoryStorage::new();
        let written = write_ttl_if_needed(&storage, "k", Freshness::Expired, 1.0, NOW).unwrap();
        assert!(written);
    }

    #[test]
    fn test_sweep_expired() {
        let storage = seeded(NOW - 1);
        storage.set_item("live", "v").unwrap();
        storage.set_item("live:ttl", &(NOW + 1).to_string()).unwrap();

        assert_eq!(sweep_expired(&storage, NOW), 1);
        assert!(storage.get_item("k").is_none());
        assert!(storage.get_item("live").is_some());
        assert_eq!(storage.len(), 2);
    }
}
