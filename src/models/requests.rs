//! Request DTOs for the proxy API
//!
//! Query strings accepted by the proxy routes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::market::settlement::{parse_date, today, yesterday};

/// Query for single-day routes (`/api/demand`, `/api/price`, `/api/imbalance`).
///
/// `date` defaults to today (UTC).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateQuery {
    #[serde(default)]
    pub date: Option<String>,
}

impl DateQuery {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        check_date("date", self.date.as_deref())
    }

    /// Settlement date after applying the default.
    pub fn resolve(&self, now: DateTime<Utc>) -> String {
        self.date.clone().unwrap_or_else(|| today(now))
    }

    /// Client-facing parameters, after defaults, as they go into the cache key.
    pub fn key_params(&self, now: DateTime<Utc>) -> BTreeMap<String, String> {
        BTreeMap::from([("date".to_string(), self.resolve(now))])
    }
}

/// Query for `/api/generation`.
///
/// `date` is the last day of the range (default today), `date_from` the
/// first (default yesterday).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationQuery {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub date_from: Option<String>,
}

impl GenerationQuery {
    /// Returns an error message if either date is malformed, None if valid.
    pub fn validate(&self) -> Option<String> {
        check_date("date", self.date.as_deref())
            .or_else(|| check_date("date_from", self.date_from.as_deref()))
    }

    /// `(date_from, date_to)` after applying defaults.
    pub fn resolve(&self, now: DateTime<Utc>) -> (String, String) {
        (
            self.date_from.clone().unwrap_or_else(|| yesterday(now)),
            self.date.clone().unwrap_or_else(|| today(now)),
        )
    }

    /// Both range ends, after defaults, as they go into the cache key.
    pub fn key_params(&self, now: DateTime<Utc>) -> BTreeMap<String, String> {
        let (from, to) = self.resolve(now);
        BTreeMap::from([("date".to_string(), to), ("date_from".to_string(), from)])
    }
}

/// Query for `POST /api/cache/clear`. Without a key every entry is dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearQuery {
    #[serde(default)]
    pub key: Option<String>,
}

fn check_date(name: &str, value: Option<&str>) -> Option<String> {
    match value {
        Some(v) if parse_date(v).is_none() => Some(format!(
            "{} must be a date formatted YYYY-MM-DD, got '{}'",
            name, v
        )),
        _ => None,
    }
}
