//! Upstream Module
//!
//! Client for the third-party market data API being proxied, plus the
//! dataset paths the proxy routes map onto.

mod client;

pub use client::{split_path, UpstreamClient};

/// Upstream dataset paths, relative to the API root.
pub mod paths {
    pub const GENERATION: &str = "generation/outturn/halfHourly";
    pub const DEMAND: &str = "demand/outturn";
    pub const MARKET_INDEX_PRICE: &str = "balancing/pricing/market-index";
    pub const IMBALANCE: &str = "datasets/IMBALNGC";
    pub const FREQUENCY: &str = "datasets/FREQ";
}
