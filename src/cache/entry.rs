//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde_json::Value;

// == Cache Entry ==
/// A cached upstream payload with its insertion and expiry timestamps.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Value,
    /// Insertion timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry that lives for `ttl_seconds`.
    pub fn new(value: Value, ttl_seconds: u64) -> Self {
        Self::at(value, ttl_seconds, current_timestamp_ms())
    }

    /// Creates an entry as if it had been inserted at `now_ms`.
    pub fn at(value: Value, ttl_seconds: u64, now_ms: u64) -> Self {
        Self {
            value,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_seconds.saturating_mul(1000)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry stays valid up to and including its expiry instant and is
    /// expired once the current time is strictly past it.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Same as [`is_expired`](Self::is_expired) against an explicit clock.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms > self.expires_at
    }

    /// Whole seconds since insertion.
    pub fn age_seconds(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.created_at) / 1000
    }

    /// Whole seconds until expiry, 0 once expired.
    pub fn expires_in(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms()) / 1000
    }

    /// Insertion time as a UTC timestamp.
    pub fn cached_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(self.created_at as i64).unwrap_or_default()
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
