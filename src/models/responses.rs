//! Response DTOs for the proxy API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cache::{CacheStats, EntryInfo};
use crate::market::SettlementPeriod;

/// Whether a payload was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// Value written to `_cache`.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
        }
    }
}

/// Merges `_cache` and `_key` into a payload.
///
/// Payloads that are not JSON objects are wrapped as `{ "data": payload }`
/// first.
pub fn annotate(payload: Value, status: CacheStatus, key: &str) -> Value {
    let mut object = match payload {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    object.insert("_cache".to_string(), Value::from(status.as_str()));
    object.insert("_key".to_string(), Value::from(key));
    Value::Object(object)
}

/// Response body for `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct IndexResponse {
    pub service: &'static str,
    pub status: &'static str,
    pub upstream: String,
    pub current_sp: SettlementPeriod,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

impl IndexResponse {
    /// Service info for `upstream`, listing every route.
    pub fn new(upstream: impl Into<String>, current_sp: SettlementPeriod) -> Self {
        let endpoints = BTreeMap::from([
            ("settlement_period", "/api/settlement-period"),
            ("generation", "/api/generation?date=YYYY-MM-DD&date_from=YYYY-MM-DD"),
            ("generation_latest", "/api/generation/latest"),
            ("demand", "/api/demand?date=YYYY-MM-DD"),
            ("price", "/api/price?date=YYYY-MM-DD"),
            ("imbalance", "/api/imbalance?date=YYYY-MM-DD"),
            ("frequency", "/api/frequency"),
            ("fuel_mix_latest", "/api/fuel-mix/latest"),
            ("summary", "/api/summary"),
            ("raw", "/api/raw/<upstream path>?<upstream params>"),
            ("cache_stats", "/api/cache/stats"),
            ("cache_clear", "POST /api/cache/clear?key=<optional key>"),
            ("health", "/health"),
        ]);

        Self {
            service: "GB Electricity Market Proxy",
            status: "ok",
            upstream: upstream.into(),
            current_sp,
            endpoints,
        }
    }
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Current timestamp in RFC 3339 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Healthy status stamped with the current time.
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for `GET /api/cache/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    /// Age and expiry per live key
    pub cache: BTreeMap<String, EntryInfo>,
    pub total_keys: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub hit_rate: f64,
}

impl CacheStatsResponse {
    /// Combines a store snapshot with its counters.
    pub fn new(entries: Vec<(String, EntryInfo)>, stats: &CacheStats) -> Self {
        let cache: BTreeMap<String, EntryInfo> = entries.into_iter().collect();
        Self {
            total_keys: cache.len(),
            cache,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for `POST /api/cache/clear`.
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// The cleared key, or `"all"`
    pub cleared: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl ClearResponse {
    /// Result of clearing a single key.
    pub fn key(key: impl Into<String>, found: bool) -> Self {
        Self {
            cleared: key.into(),
            found: Some(found),
            count: None,
        }
    }

    /// Result of clearing every key.
    pub fn all(count: usize) -> Self {
        Self {
            cleared: "all".to_string(),
            found: None,
            count: Some(count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::current_settlement_period;
    use serde_json::json;

    #[test]
    fn test_annotate_object() {
        let out = annotate(json!({"data": [1]}), CacheStatus::Hit, "demand?date=2025-02-17");
        assert_eq!(out["data"], json!([1]));
        assert_eq!(out["_cache"], "hit");
        assert_eq!(out["_key"], "demand?date=2025-02-17");
    }

    #[test]
    fn test_annotate_wraps_non_object() {
        let out = annotate(json!([1, 2, 3]), CacheStatus::Miss, "raw/x");
        assert_eq!(out["data"], json!([1, 2, 3]));
        assert_eq!(out["_cache"], "miss");
    }

    #[test]
    fn test_clear_response_shapes() {
        let one = serde_json::to_value(ClearResponse::key("summary", true)).unwrap();
        assert_eq!(one, json!({"cleared": "summary", "found": true}));

        let all = serde_json::to_value(ClearResponse::all(4)).unwrap();
        assert_eq!(all, json!({"cleared": "all", "count": 4}));
    }

    #[test]
    fn test_index_lists_endpoints() {
        let index = IndexResponse::new(
            "https://upstream.test",
            current_settlement_period(chrono::Utc::now()),
        );
        let json = serde_json::to_value(&index).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["endpoints"]["summary"], "/api/summary");
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy()).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_stats_response_counts_keys() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        let entry = crate::cache::CacheEntry::new(json!({}), 60);

        let resp = CacheStatsResponse::new(vec![("frequency".into(), EntryInfo::from(&entry))], &stats);
        assert_eq!(resp.total_keys, 1);
        assert_eq!(resp.hit_rate, 0.5);
    }
}
