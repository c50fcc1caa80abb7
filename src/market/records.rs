//! Typed views over upstream dataset rows.
//!
//! Every dataset arrives as `{ "data": [ ... ] }`. Field names drift between
//! datasets and API versions, so each record exposes an accessor that falls
//! back across the known spellings.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ProxyError, Result};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

// == Dataset Envelope ==
/// Extracts the `data` rows of an upstream payload.
///
/// A payload without `data` yields no rows; rows of the wrong shape are an
/// upstream payload error.
pub fn parse_dataset<T: DeserializeOwned>(payload: Value) -> Result<Vec<T>> {
    serde_json::from_value::<Envelope<T>>(payload)
        .map(|envelope| envelope.data)
        .map_err(|e| ProxyError::InvalidUpstreamPayload(e.to_string()))
}

// == Records ==
/// Half-hourly generation outturn for one fuel type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub settlement_period: u32,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub generation: Option<f64>,
    #[serde(default)]
    pub quantity: Option<f64>,
}

impl GenerationRecord {
    /// `generation`, else `quantity`, else 0.
    pub fn mw(&self) -> f64 {
        self.generation.or(self.quantity).unwrap_or(0.0)
    }

    /// Fuel type, skipping blank values.
    pub fn fuel(&self) -> Option<&str> {
        self.fuel_type.as_deref().filter(|f| !f.is_empty())
    }
}

/// Demand outturn for one settlement period.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandRecord {
    pub settlement_period: u32,
    #[serde(default)]
    pub initial_demand_outturn: Option<f64>,
    #[serde(default)]
    pub demand: Option<f64>,
}

impl DemandRecord {
    /// `initialDemandOutturn`, else `demand`, else 0.
    pub fn mw(&self) -> f64 {
        self.initial_demand_outturn.or(self.demand).unwrap_or(0.0)
    }
}

/// Market index price for one settlement period and provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    pub settlement_period: u32,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Indicated imbalance for one settlement period.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImbalanceRecord {
    pub settlement_period: u32,
    #[serde(default)]
    pub imbalance: Option<f64>,
    #[serde(default)]
    pub indicated_imbalance: Option<f64>,
    #[serde(default)]
    pub value: Option<f64>,
}

impl ImbalanceRecord {
    /// First of `imbalance`, `indicatedImbalance`, `value`, else 0.
    pub fn mw(&self) -> f64 {
        self.imbalance
            .or(self.indicated_imbalance)
            .or(self.value)
            .unwrap_or(0.0)
    }
}

/// System frequency sample.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyRecord {
    #[serde(default)]
    pub publish_time: Option<String>,
    #[serde(default)]
    pub frequency: Option<f64>,
    #[serde(default)]
    pub value: Option<f64>,
}

impl FrequencyRecord {
    /// `frequency`, else `value`, else nominal.
    pub fn hz(&self) -> f64 {
        self.frequency.or(self.value).unwrap_or(super::NOMINAL_HZ)
    }
}
