//! Cache Module
//!
//! In-memory TTL cache for upstream payloads, keyed by endpoint and sorted
//! query parameters.

mod entry;
mod key;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use key::cache_key;
pub use stats::{CacheStats, EntryInfo};
pub use store::CacheStore;
