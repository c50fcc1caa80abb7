//! Cache Statistics Module
//!
//! Counters for the store plus the per-key view served by `/api/cache/stats`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::CacheEntry;

// == Cache Stats ==
/// Running counters for the cache store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
    /// Entries dropped to stay under capacity
    pub evictions: u64,
    /// Expired entries removed by reads or the background sweep
    pub expirations: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// hits / (hits + misses), or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Recorders ==
    /// Counts a lookup served from the cache.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Counts a lookup that found nothing live.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Counts one entry dropped for capacity.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Adds `count` expired entries to the running total.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    /// Overwrites the current entry count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Entry Info ==
/// Age and expiry of a single cached key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryInfo {
    pub age_seconds: u64,
    pub expires_in: u64,
    pub cached_at_utc: DateTime<Utc>,
}

impl From<&CacheEntry> for EntryInfo {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            age_seconds: entry.age_seconds(),
            expires_in: entry.expires_in(),
            cached_at_utc: entry.cached_at(),
        }
    }
}
