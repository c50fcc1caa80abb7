//! Settlement period arithmetic.
//!
//! The GB market day is split into 48 half-hour settlement periods, numbered
//! from 1 at 00:00 UTC.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use serde::Serialize;

/// Half-hour periods in a settlement day.
pub const PERIODS_PER_DAY: u32 = 48;

/// The settlement period containing a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementPeriod {
    pub settlement_date: String,
    pub settlement_period: u32,
    pub period_start_utc: String,
    pub period_end_utc: String,
    pub periods_per_day: u32,
    pub next_sp: u32,
}

/// Settlement period for `now`.
pub fn current_settlement_period(now: DateTime<Utc>) -> SettlementPeriod {
    let minutes = now.hour() * 60 + now.minute();
    let sp = minutes / 30 + 1;

    let midnight = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc();
    let start = midnight + Duration::minutes(i64::from((sp - 1) * 30));
    let end = start + Duration::minutes(30);

    SettlementPeriod {
        settlement_date: date_str(now.date_naive()),
        settlement_period: sp,
        period_start_utc: start.to_rfc3339(),
        period_end_utc: end.to_rfc3339(),
        periods_per_day: PERIODS_PER_DAY,
        next_sp: sp % PERIODS_PER_DAY + 1,
    }
}

/// `YYYY-MM-DD` for today in UTC.
pub fn today(now: DateTime<Utc>) -> String {
    date_str(now.date_naive())
}

/// `YYYY-MM-DD` for yesterday in UTC.
pub fn yesterday(now: DateTime<Utc>) -> String {
    date_str((now - Duration::days(1)).date_naive())
}

/// Start of the trailing one-hour frequency window, as the upstream expects it.
pub fn frequency_window_start(now: DateTime<Utc>) -> String {
    (now - Duration::hours(1))
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

/// Parses a `YYYY-MM-DD` date, returning `None` when malformed.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn date_str(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
