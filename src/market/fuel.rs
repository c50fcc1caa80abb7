//! Generation and fuel-mix reshaping.

use std::collections::BTreeMap;

use serde::Serialize;

use super::records::GenerationRecord;
use super::{percentage, round_to};

// == Fuel Classification ==
/// Fuel types counted as renewable.
pub const RENEWABLE_FUELS: &[&str] = &["WIND", "SOLAR", "NPSHYD", "HYDRO", "BIOMASS"];

/// Human-readable label for an upstream fuel code.
pub fn fuel_label(fuel_type: &str) -> &str {
    match fuel_type {
        "CCGT" => "Gas CCGT",
        "OCGT" => "Gas OCGT",
        "OIL" => "Oil",
        "COAL" => "Coal",
        "NUCLEAR" => "Nuclear",
        "WIND" => "Wind",
        "PS" => "Pumped Storage",
        "NPSHYD" => "Hydro",
        "OTHER" => "Other",
        "INTFR" => "France IC",
        "INTIRL" => "Ireland IC",
        "INTNED" => "Netherlands IC",
        "INTEW" => "E-W IC",
        "INTNEM" => "NEMO IC",
        "BIOMASS" => "Biomass",
        "SOLAR" => "Solar",
        other => other,
    }
}

/// Returns true for the fuels in [`RENEWABLE_FUELS`].
pub fn is_renewable(fuel_type: &str) -> bool {
    RENEWABLE_FUELS.contains(&fuel_type)
}

/// Renewables plus nuclear.
pub fn is_low_carbon(fuel_type: &str) -> bool {
    is_renewable(fuel_type) || fuel_type == "NUCLEAR"
}

// == Latest Period ==
/// Generation rows of the most recent settlement period in a dataset.
#[derive(Debug, Clone)]
pub struct LatestPeriod<'a> {
    pub settlement_period: u32,
    pub rows: Vec<&'a GenerationRecord>,
    /// Sum of every row, unrounded
    pub total_mw: f64,
}

impl<'a> LatestPeriod<'a> {
    /// Picks out the highest settlement period, or `None` for an empty dataset.
    pub fn from_records(records: &'a [GenerationRecord]) -> Option<Self> {
        let settlement_period = records.iter().map(|r| r.settlement_period).max()?;
        let rows: Vec<&GenerationRecord> = records
            .iter()
            .filter(|r| r.settlement_period == settlement_period)
            .collect();
        let total_mw = rows.iter().map(|r| r.mw()).sum();

        Some(Self {
            settlement_period,
            rows,
            total_mw,
        })
    }

    /// Rounded MW per fuel type.
    pub fn fuels(&self) -> BTreeMap<String, i64> {
        self.rows
            .iter()
            .filter_map(|r| r.fuel().map(|f| (f.to_string(), r.mw().round() as i64)))
            .collect()
    }
}

// == Latest Generation ==
/// Payload of `/api/generation/latest`.
#[derive(Debug, Clone, Serialize)]
pub struct LatestGeneration {
    pub settlement_date: String,
    pub settlement_period: u32,
    pub total_mw: i64,
    pub fuels: BTreeMap<String, i64>,
}

impl LatestGeneration {
    /// Totals the latest period of `records`, or `None` when there are no rows.
    pub fn build(records: &[GenerationRecord], settlement_date: &str) -> Option<Self> {
        let latest = LatestPeriod::from_records(records)?;
        Some(Self {
            settlement_date: settlement_date.to_string(),
            settlement_period: latest.settlement_period,
            total_mw: latest.total_mw.round() as i64,
            fuels: latest.fuels(),
        })
    }
}

// == Fuel Mix ==
/// One fuel's share of total generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelShare {
    pub fuel_type: String,
    pub label: String,
    pub mw: i64,
    pub percentage: f64,
}

/// Payload of `/api/fuel-mix/latest`.
#[derive(Debug, Clone, Serialize)]
pub struct FuelMix {
    pub settlement_date: String,
    pub settlement_period: u32,
    pub total_mw: i64,
    pub renewable_mw: i64,
    pub renewable_pct: f64,
    pub low_carbon_mw: i64,
    pub low_carbon_pct: f64,
    /// Producing fuels, largest first
    pub fuels: Vec<FuelShare>,
}

impl FuelMix {
    /// Shares of the latest period of `records`, largest fuel first.
    ///
    /// Fuels producing nothing are left out. `None` when there are no rows.
    pub fn build(records: &[GenerationRecord], settlement_date: &str) -> Option<Self> {
        let latest = LatestPeriod::from_records(records)?;
        let total = latest.total_mw;

        let mut rows = latest.rows.clone();
        rows.sort_by(|a, b| b.mw().total_cmp(&a.mw()));

        let fuels: Vec<FuelShare> = rows
            .into_iter()
            .filter_map(|r| {
                let fuel_type = r.fuel()?;
                let mw = r.mw().round() as i64;
                (mw > 0).then(|| FuelShare {
                    fuel_type: fuel_type.to_string(),
                    label: fuel_label(fuel_type).to_string(),
                    mw,
                    percentage: round_to(percentage(mw as f64, total), 1),
                })
            })
            .collect();

        let renewable_mw: i64 = fuels
            .iter()
            .filter(|f| is_renewable(&f.fuel_type))
            .map(|f| f.mw)
            .sum();
        let low_carbon_mw: i64 = fuels
            .iter()
            .filter(|f| is_low_carbon(&f.fuel_type))
            .map(|f| f.mw)
            .sum();

        Some(Self {
            settlement_date: settlement_date.to_string(),
            settlement_period: latest.settlement_period,
            total_mw: total.round() as i64,
            renewable_mw,
            renewable_pct: round_to(percentage(renewable_mw as f64, total), 1),
            low_carbon_mw,
            low_carbon_pct: round_to(percentage(low_carbon_mw as f64, total), 1),
            fuels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::records::parse_dataset;
    use serde_json::json;

    fn sample() -> Vec<GenerationRecord> {
        parse_dataset(json!({
            "data": [
                {"settlementPeriod": 19, "fuelType": "WIND", "generation": 1.0},
                {"settlementPeriod": 20, "fuelType": "WIND", "generation": 6000.0},
                {"settlementPeriod": 20, "fuelType": "CCGT", "generation": 8000.0},
                {"settlementPeriod": 20, "fuelType": "NUCLEAR", "generation": 4000.0},
                {"settlementPeriod": 20, "fuelType": "SOLAR", "generation": 2000.0},
                {"settlementPeriod": 20, "fuelType": "PS", "generation": -200.0},
                {"settlementPeriod": 20, "fuelType": "INTXYZ", "quantity": 200.0}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_labels() {
        assert_eq!(fuel_label("NPSHYD"), "Hydro");
        assert_eq!(fuel_label("INTNEM"), "NEMO IC");
        assert_eq!(fuel_label("NEWFUEL"), "NEWFUEL");
    }

    #[test]
    fn test_latest_generation_uses_highest_period() {
        let latest = LatestGeneration::build(&sample(), "2025-02-17").unwrap();

        assert_eq!(latest.settlement_period, 20);
        assert_eq!(latest.total_mw, 20_000);
        assert_eq!(latest.fuels["WIND"], 6000);
        assert_eq!(latest.fuels["PS"], -200);
        assert_eq!(latest.fuels.len(), 6);
    }

    #[test]
    fn test_latest_generation_empty() {
        assert!(LatestGeneration::build(&[], "2025-02-17").is_none());
    }

    #[test]
    fn test_fuel_mix_shares() {
        let mix = FuelMix::build(&sample(), "2025-02-17").unwrap();

        // Negative flows are left out of the shares but still count in the total
        let order: Vec<&str> = mix.fuels.iter().map(|f| f.fuel_type.as_str()).collect();
        assert_eq!(order, vec!["CCGT", "WIND", "NUCLEAR", "SOLAR", "INTXYZ"]);

        assert_eq!(mix.total_mw, 20_000);
        assert_eq!(mix.fuels[0].label, "Gas CCGT");
        assert_eq!(mix.fuels[0].percentage, 40.0);
        assert_eq!(mix.renewable_mw, 8000);
        assert_eq!(mix.renewable_pct, 40.0);
        assert_eq!(mix.low_carbon_mw, 12_000);
        assert_eq!(mix.low_carbon_pct, 60.0);
    }

    #[test]
    fn test_fuel_mix_zero_total() {
        let records: Vec<GenerationRecord> = parse_dataset(json!({
            "data": [{"settlementPeriod": 3, "fuelType": "WIND", "generation": 0.0}]
        }))
        .unwrap();

        let mix = FuelMix::build(&records, "2025-02-17").unwrap();
        assert!(mix.fuels.is_empty());
        assert_eq!(mix.renewable_pct, 0.0);
    }
}
