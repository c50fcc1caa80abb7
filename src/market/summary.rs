//! Dashboard summary: one object with the latest value of every KPI.

use std::collections::BTreeMap;

use serde::Serialize;

use super::fuel::LatestPeriod;
use super::records::{DemandRecord, FrequencyRecord, GenerationRecord, ImbalanceRecord, PriceRecord};
use super::settlement::SettlementPeriod;
use super::{percentage, round_to, NOMINAL_HZ};
use crate::error::Result;

// == Sections ==
/// Latest-period generation headline figures.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub total_mw: i64,
    pub fuels: BTreeMap<String, i64>,
    pub wind_mw: i64,
    pub solar_mw: i64,
    pub nuclear_mw: i64,
    pub wind_pct: f64,
    pub solar_pct: f64,
}

impl GenerationSummary {
    /// Totals and wind/solar/nuclear shares of the latest period.
    pub fn build(records: &[GenerationRecord]) -> Option<Self> {
        let latest = LatestPeriod::from_records(records)?;
        let total = latest.total_mw;
        let fuels = latest.fuels();
        let mw = |fuel: &str| fuels.get(fuel).copied().unwrap_or(0);

        Some(Self {
            total_mw: total.round() as i64,
            wind_mw: mw("WIND"),
            solar_mw: mw("SOLAR"),
            nuclear_mw: mw("NUCLEAR"),
            wind_pct: round_to(percentage(mw("WIND") as f64, total), 1),
            solar_pct: round_to(percentage(mw("SOLAR") as f64, total), 1),
            fuels,
        })
    }
}

/// Demand of the latest settlement period.
#[derive(Debug, Clone, Serialize)]
pub struct DemandSummary {
    pub mw: f64,
    pub settlement_period: u32,
}

impl DemandSummary {
    /// Picks the row with the highest settlement period.
    pub fn build(records: &[DemandRecord]) -> Option<Self> {
        let latest = records.iter().max_by_key(|r| r.settlement_period)?;
        Some(Self {
            mw: latest.mw(),
            settlement_period: latest.settlement_period,
        })
    }
}

/// Latest market index price and its movement.
#[derive(Debug, Clone, Serialize)]
pub struct PriceSummary {
    pub gbp_per_mwh: f64,
    pub settlement_period: u32,
    /// Change against the previous priced period
    pub change_gbp: f64,
}

impl PriceSummary {
    /// Latest priced period; rows without a price are ignored.
    pub fn build(records: &[PriceRecord]) -> Option<Self> {
        let mut priced: Vec<(u32, f64)> = records
            .iter()
            .filter_map(|r| r.price.map(|p| (r.settlement_period, p)))
            .collect();
        // Stable, so providers sharing a period keep upstream order
        priced.sort_by_key(|(sp, _)| *sp);

        let (settlement_period, price) = *priced.last()?;
        let previous = if priced.len() >= 2 {
            priced[priced.len() - 2].1
        } else {
            price
        };

        Some(Self {
            gbp_per_mwh: round_to(price, 2),
            settlement_period,
            change_gbp: round_to(price - previous, 2),
        })
    }
}

/// Indicated imbalance of the latest settlement period.
#[derive(Debug, Clone, Serialize)]
pub struct ImbalanceSummary {
    pub mw: i64,
    pub settlement_period: u32,
}

impl ImbalanceSummary {
    /// Picks the row with the highest settlement period, rounded to whole MW.
    pub fn build(records: &[ImbalanceRecord]) -> Option<Self> {
        let latest = records.iter().max_by_key(|r| r.settlement_period)?;
        Some(Self {
            mw: latest.mw().round() as i64,
            settlement_period: latest.settlement_period,
        })
    }
}

// == Frequency ==
/// How far system frequency is from nominal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyStatus {
    Normal,
    Deviation,
    Alert,
}

impl FrequencyStatus {
    /// Normal under 0.05 Hz from nominal, deviation under 0.2 Hz, else alert.
    pub fn classify(hz: f64) -> Self {
        let deviation = (hz - NOMINAL_HZ).abs();
        if deviation < 0.05 {
            FrequencyStatus::Normal
        } else if deviation < 0.2 {
            FrequencyStatus::Deviation
        } else {
            FrequencyStatus::Alert
        }
    }
}

/// Most recent frequency sample against nominal.
#[derive(Debug, Clone, Serialize)]
pub struct FrequencySummary {
    pub hz: f64,
    pub nominal_hz: f64,
    pub deviation: f64,
    pub status: FrequencyStatus,
    pub published_at: Option<String>,
}

impl FrequencySummary {
    /// Uses the sample with the latest publish time.
    pub fn build(records: &[FrequencyRecord]) -> Option<Self> {
        let latest = records
            .iter()
            .max_by(|a, b| publish_time(a).cmp(publish_time(b)))?;
        let hz = latest.hz();

        Some(Self {
            hz: round_to(hz, 3),
            nominal_hz: NOMINAL_HZ,
            deviation: round_to(hz - NOMINAL_HZ, 3),
            status: FrequencyStatus::classify(hz),
            published_at: latest.publish_time.clone(),
        })
    }
}

fn publish_time(record: &FrequencyRecord) -> &str {
    record.publish_time.as_deref().unwrap_or("")
}

// == Summary ==
/// Payload of `/api/summary`.
///
/// A section whose fetch failed is left out and its error is listed under
/// `_errors`; a section whose dataset was empty is simply left out.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub settlement_period: SettlementPeriod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<GenerationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demand: Option<DemandSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imbalance: Option<ImbalanceSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<FrequencySummary>,
    #[serde(rename = "_errors", skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

impl Summary {
    /// Empty summary for the given period; sections are filled in by [`Summary::section`].
    pub fn new(settlement_period: SettlementPeriod) -> Self {
        Self {
            settlement_period,
            generation: None,
            demand: None,
            price: None,
            imbalance: None,
            frequency: None,
            errors: BTreeMap::new(),
        }
    }

    /// Builds one section from a fetch result, recording the error if it failed.
    pub fn section<T, S>(
        &mut self,
        name: &str,
        rows: Result<Vec<T>>,
        build: impl FnOnce(&[T]) -> Option<S>,
    ) -> Option<S> {
        match rows {
            Ok(rows) => build(&rows),
            Err(e) => {
                self.errors.insert(name.to_string(), e.to_string());
                None
            }
        }
    }
}
