//! Configuration Module
//!
//! Handles loading and managing proxy configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default upstream: the Elexon BMRS public API.
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://data.elexon.co.uk/bmrs/api/v1";

// == TTL Classes ==
/// Groups routes that share a cache lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlClass {
    Generation,
    Demand,
    Price,
    Imbalance,
    Frequency,
    Summary,
    Raw,
}

/// Cache lifetime in seconds for each [`TtlClass`].
///
/// Half-hourly datasets are republished a few minutes after each settlement
/// period ends, so 10 minutes is enough; frequency is published every ~30s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlPolicy {
    pub generation: u64,
    pub demand: u64,
    pub price: u64,
    pub imbalance: u64,
    pub frequency: u64,
    pub summary: u64,
    pub raw: u64,
}

impl TtlPolicy {
    /// Returns the TTL in seconds for the given class.
    pub fn ttl_for(&self, class: TtlClass) -> u64 {
        match class {
            TtlClass::Generation => self.generation,
            TtlClass::Demand => self.demand,
            TtlClass::Price => self.price,
            TtlClass::Imbalance => self.imbalance,
            TtlClass::Frequency => self.frequency,
            TtlClass::Summary => self.summary,
            TtlClass::Raw => self.raw,
        }
    }

    /// Same TTL for every class. Mostly useful in tests.
    pub fn uniform(ttl: u64) -> Self {
        Self {
            generation: ttl,
            demand: ttl,
            price: ttl,
            imbalance: ttl,
            frequency: ttl,
            summary: ttl,
            raw: ttl,
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            generation: 600,
            demand: 600,
            price: 600,
            imbalance: 600,
            frequency: 60,
            summary: 60,
            raw: 300,
        }
    }
}

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the upstream API
    pub upstream_base_url: String,
    /// Upstream request timeout in seconds
    pub upstream_timeout: u64,
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Per-route cache lifetimes
    pub ttl: TtlPolicy,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 8000)
    /// - `UPSTREAM_BASE_URL` - Upstream API root (default: Elexon BMRS v1)
    /// - `UPSTREAM_TIMEOUT` - Upstream timeout in seconds (default: 15)
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 30)
    /// - `TTL_GENERATION`, `TTL_DEMAND`, `TTL_PRICE`, `TTL_IMBALANCE`,
    ///   `TTL_FREQUENCY`, `TTL_SUMMARY`, `TTL_RAW` - per-class TTLs in seconds
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let ttl = TtlPolicy {
            generation: env_or("TTL_GENERATION", defaults.ttl.generation),
            demand: env_or("TTL_DEMAND", defaults.ttl.demand),
            price: env_or("TTL_PRICE", defaults.ttl.price),
            imbalance: env_or("TTL_IMBALANCE", defaults.ttl.imbalance),
            frequency: env_or("TTL_FREQUENCY", defaults.ttl.frequency),
            summary: env_or("TTL_SUMMARY", defaults.ttl.summary),
            raw: env_or("TTL_RAW", defaults.ttl.raw),
        };

        Self {
            server_port: env_or("PORT", defaults.server_port),
            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.upstream_base_url),
            upstream_timeout: env_or("UPSTREAM_TIMEOUT", defaults.upstream_timeout),
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            ttl,
        }
    }

    /// Upstream timeout as a `Duration`.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8000,
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            upstream_timeout: 15,
            max_entries: 1000,
            cleanup_interval: 30,
            ttl: TtlPolicy::default(),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
