//! API Module
//!
//! HTTP handlers and routing for the proxy.
//!
//! # Endpoints
//! - `GET /` - Service info and route index
//! - `GET /health` - Health check
//! - `GET /api/settlement-period` - Current settlement period
//! - `GET /api/generation`, `/api/demand`, `/api/price`, `/api/imbalance`,
//!   `/api/frequency` - Cached upstream datasets
//! - `GET /api/generation/latest`, `/api/fuel-mix/latest`, `/api/summary` -
//!   Reshaped payloads
//! - `GET /api/raw/*path` - Cached passthrough of any upstream path
//! - `GET /api/cache/stats`, `POST /api/cache/clear` - Cache management

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
