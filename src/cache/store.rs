//! Cache Store Module
//!
//! Keyed TTL storage for upstream payloads.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{CacheEntry, CacheStats, EntryInfo};

// == Cache Store ==
/// In-memory payload cache with per-entry TTL and a capacity bound.
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
    max_entries: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store that holds at most `max_entries` payloads.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
        }
    }

    // == Get ==
    /// Returns the payload for `key` if present and not expired.
    ///
    /// An expired entry is dropped on the spot and counted as a miss.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let hit = match self.entries.get(key) {
            Some(entry) if entry.is_expired() => None,
            Some(entry) => {
                debug!(key, age = entry.age_seconds(), "cache hit");
                Some(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        match hit {
            Some(value) => {
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.entries.remove(key);
                self.stats.record_expirations(1);
                self.stats.record_miss();
                self.stats.set_total_entries(self.entries.len());
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl` seconds.
    ///
    /// Overwriting an existing key resets its TTL. When the store is full,
    /// the entry closest to expiry makes room for a new key.
    pub fn set(&mut self, key: String, value: Value, ttl: u64) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_one();
        }

        info!(key = %key, ttl, "cache set");
        self.entries.insert(key, CacheEntry::new(value, ttl));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Remove ==
    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let found = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        found
    }

    // == Clear ==
    /// Drops every entry, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.stats.set_total_entries(0);
        count
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning the number removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before - self.entries.len();

        self.stats.record_expirations(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Snapshot ==
    /// Age and expiry of every live entry, sorted by key.
    pub fn snapshot(&self) -> Vec<(String, EntryInfo)> {
        let mut rows: Vec<(String, EntryInfo)> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, entry)| (key.clone(), EntryInfo::from(entry)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    // == Stats ==
    /// Copy of the counters with `total_entries` brought up to date.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Len ==
    /// Number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Evict One ==
    /// Drops the entry that would expire first.
    fn evict_one(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.expires_at)
            .map(|(key, _)| key.clone());

        if let Some(key) = victim {
            debug!(key = %key, "evicting to stay under capacity");
            self.entries.remove(&key);
            self.stats.record_eviction();
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_store_new() {
        let store = CacheStore::new(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = CacheStore::new(100);

        store.set("demand?date=2025-02-17".into(), json!({"data": [1]}), 600);

        assert_eq!(store.get("demand?date=2025-02-17"), Some(json!({"data": [1]})));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_repeated_get_returns_same_payload() {
        let mut store = CacheStore::new(100);
        store.set("price".into(), json!({"data": [{"price": 71.5}]}), 600);

        let first = store.get("price");
        let second = store.get("price");
        assert_eq!(first, second);
        assert_eq!(store.stats().hits, 2);
    }

    #[test]
    fn test_store_get_missing() {
        let mut store = CacheStore::new(100);
        assert!(store.get("nope").is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_overwrite_resets_payload() {
        let mut store = CacheStore::new(100);

        store.set("k".into(), json!(1), 600);
        store.set("k".into(), json!(2), 600);

        assert_eq!(store.get("k"), Some(json!(2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = CacheStore::new(100);
        store.set("frequency".into(), json!({"data": []}), 1);

        assert!(store.get("frequency").is_some());

        sleep(Duration::from_millis(1100));

        assert!(store.get("frequency").is_none());
        assert!(store.is_empty());
        let stats = store.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_store_remove_and_clear() {
        let mut store = CacheStore::new(100);
        store.set("a".into(), json!(1), 600);
        store.set("b".into(), json!(2), 600);
        store.set("c".into(), json!(3), 600);

        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert_eq!(store.len(), 2);

        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
        assert_eq!(store.clear(), 0);
    }

    #[test]
    fn test_store_evicts_entry_closest_to_expiry() {
        let mut store = CacheStore::new(2);
        store.set("long".into(), json!(1), 600);
        store.set("short".into(), json!(2), 60);

        store.set("new".into(), json!(3), 300);

        assert_eq!(store.len(), 2);
        assert!(store.get("short").is_none());
        assert!(store.get("long").is_some());
        assert!(store.get("new").is_some());
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_overwrite_at_capacity_does_not_evict() {
        let mut store = CacheStore::new(1);
        store.set("only".into(), json!(1), 60);
        store.set("only".into(), json!(2), 60);

        assert_eq!(store.stats().evictions, 0);
        assert_eq!(store.get("only"), Some(json!(2)));
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = CacheStore::new(100);
        store.set("short".into(), json!(1), 1);
        store.set("long".into(), json!(2), 10);

        sleep(Duration::from_millis(1100));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("long").is_some());
    }

    #[test]
    fn test_store_snapshot_sorted() {
        let mut store = CacheStore::new(100);
        store.set("summary".into(), json!({}), 60);
        store.set("demand".into(), json!({}), 600);

        let keys: Vec<String> = store.snapshot().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["demand".to_string(), "summary".to_string()]);
    }
}
