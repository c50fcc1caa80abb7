//! GB Grid Proxy - A caching proxy for the Elexon BMRS API
//!
//! Forwards read-only requests to the upstream market data API, caches the
//! responses in memory per endpoint TTL, and reshapes a few datasets into
//! summary payloads for a dashboard.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod market;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::ProxyError;
pub use tasks::spawn_cleanup_task;
