//! Request and Response models for the proxy API
//!
//! DTOs used for deserializing query strings and serializing response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ClearQuery, DateQuery, GenerationQuery};
pub use responses::{
    annotate, CacheStatsResponse, CacheStatus, ClearResponse, HealthResponse, IndexResponse,
};
