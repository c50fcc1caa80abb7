//! Market Module
//!
//! Turns raw upstream datasets into the simplified payloads the dashboard
//! consumes. Everything here is pure; fetching happens in the API layer.

pub mod fuel;
pub mod records;
pub mod settlement;
pub mod summary;

pub use fuel::{fuel_label, FuelMix, FuelShare, LatestGeneration};
pub use records::{
    parse_dataset, DemandRecord, FrequencyRecord, GenerationRecord, ImbalanceRecord, PriceRecord,
};
pub use settlement::{current_settlement_period, SettlementPeriod};
pub use summary::{FrequencyStatus, Summary};

/// GB grid nominal frequency.
pub const NOMINAL_HZ: f64 = 50.0;

/// Rounds to `places` decimal places, half away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `part / total * 100`, or 0 when there is no total.
pub fn percentage(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        part / total * 100.0
    }
}
