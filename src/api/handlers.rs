//! API Handlers
//!
//! HTTP request handlers for each proxy endpoint.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use crate::cache::{cache_key, CacheStore};
use crate::config::{Config, TtlClass, TtlPolicy};
use crate::error::{ProxyError, Result};
use crate::market::settlement::{frequency_window_start, today};
use crate::market::summary::{
    DemandSummary, FrequencySummary, GenerationSummary, ImbalanceSummary, PriceSummary,
};
use crate::market::{
    current_settlement_period, parse_dataset, DemandRecord, FrequencyRecord, FuelMix,
    GenerationRecord, ImbalanceRecord, LatestGeneration, PriceRecord, SettlementPeriod, Summary,
};
use crate::models::{
    annotate, CacheStatsResponse, CacheStatus, ClearQuery, ClearResponse, DateQuery,
    GenerationQuery, HealthResponse, IndexResponse,
};
use crate::upstream::{paths, split_path, UpstreamClient};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: Arc<RwLock<CacheStore>>,
    pub upstream: UpstreamClient,
    pub ttl: TtlPolicy,
}

impl AppState {
    /// Wraps the store for sharing between handlers.
    pub fn new(cache: CacheStore, upstream: UpstreamClient, ttl: TtlPolicy) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            upstream,
            ttl,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            CacheStore::new(config.max_entries),
            UpstreamClient::from_config(config)?,
            config.ttl.clone(),
        ))
    }

    /// Serves `key` from the cache, or awaits `produce` and caches its result.
    ///
    /// The cache lock is released while `produce` runs. Errors are returned
    /// as-is and nothing is cached.
    async fn cached<F>(&self, key: String, class: TtlClass, produce: F) -> Result<Json<Value>>
    where
        F: Future<Output = Result<Value>>,
    {
        let hit = self.cache.write().await.get(&key);
        if let Some(payload) = hit {
            return Ok(Json(annotate(payload, CacheStatus::Hit, &key)));
        }

        let payload = produce.await?;
        self.cache
            .write()
            .await
            .set(key.clone(), payload.clone(), self.ttl.ttl_for(class));

        Ok(Json(annotate(payload, CacheStatus::Miss, &key)))
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Vec<T>> {
        parse_dataset(self.upstream.fetch(path, params).await?)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ProxyError::Internal(e.to_string()))
}

fn day_range(from: &str, to: &str) -> Vec<(String, String)> {
    vec![
        ("settlementDateFrom".to_string(), from.to_string()),
        ("settlementDateTo".to_string(), to.to_string()),
    ]
}

/// Handler for GET /
///
/// Service info and the list of routes.
pub async fn index_handler(State(state): State<AppState>) -> Json<IndexResponse> {
    Json(IndexResponse::new(
        state.upstream.base_url(),
        current_settlement_period(Utc::now()),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /api/settlement-period
pub async fn settlement_period_handler() -> Json<SettlementPeriod> {
    Json(current_settlement_period(Utc::now()))
}

/// Handler for GET /api/generation
///
/// Half-hourly generation outturn by fuel type over a date range.
pub async fn generation_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<GenerationQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(query) = query?;
    if let Some(error_msg) = query.validate() {
        return Err(ProxyError::BadRequest(error_msg));
    }

    let now = Utc::now();
    let (from, to) = query.resolve(now);
    let key = cache_key("generation", &query.key_params(now));
    let params = day_range(&from, &to);

    state
        .cached(key, TtlClass::Generation, state.upstream.fetch(paths::GENERATION, &params))
        .await
}

/// Handler for GET /api/generation/latest
///
/// Generation of the most recent settlement period reported today.
pub async fn generation_latest_handler(State(state): State<AppState>) -> Result<Json<Value>> {
    let date = today(Utc::now());
    let params = day_range(&date, &date);

    let produce = async {
        let rows: Vec<GenerationRecord> = state.fetch_rows(paths::GENERATION, &params).await?;
        let latest = LatestGeneration::build(&rows, &date)
            .ok_or_else(|| ProxyError::NoData("No data available".to_string()))?;
        to_json(&latest)
    };

    state
        .cached("generation/latest".to_string(), TtlClass::Generation, produce)
        .await
}

/// Handler for GET /api/demand
pub async fn demand_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<DateQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(query) = query?;
    single_day_proxy(state, query, "demand", paths::DEMAND, TtlClass::Demand).await
}

/// Handler for GET /api/price
///
/// Market index price; this dataset takes a single `settlementDate`.
pub async fn price_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<DateQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(query) = query?;
    if let Some(error_msg) = query.validate() {
        return Err(ProxyError::BadRequest(error_msg));
    }

    let now = Utc::now();
    let key = cache_key("price", &query.key_params(now));
    let params = vec![("settlementDate".to_string(), query.resolve(now))];

    state
        .cached(
            key,
            TtlClass::Price,
            state.upstream.fetch(paths::MARKET_INDEX_PRICE, &params),
        )
        .await
}

/// Handler for GET /api/imbalance
pub async fn imbalance_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<DateQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(query) = query?;
    single_day_proxy(state, query, "imbalance", paths::IMBALANCE, TtlClass::Imbalance).await
}

async fn single_day_proxy(
    state: AppState,
    query: DateQuery,
    endpoint: &str,
    path: &str,
    class: TtlClass,
) -> Result<Json<Value>> {
    if let Some(error_msg) = query.validate() {
        return Err(ProxyError::BadRequest(error_msg));
    }

    let now = Utc::now();
    let date = query.resolve(now);
    let key = cache_key(endpoint, &query.key_params(now));
    let params = day_range(&date, &date);

    state
        .cached(key, class, state.upstream.fetch(path, &params))
        .await
}

/// Handler for GET /api/frequency
///
/// System frequency over the last hour. The window moves every second, so
/// the key carries no parameters.
pub async fn frequency_handler(State(state): State<AppState>) -> Result<Json<Value>> {
    let params = vec![(
        "publishDateTimeFrom".to_string(),
        frequency_window_start(Utc::now()),
    )];

    state
        .cached(
            "frequency".to_string(),
            TtlClass::Frequency,
            state.upstream.fetch(paths::FREQUENCY, &params),
        )
        .await
}

/// Handler for GET /api/fuel-mix/latest
///
/// Fuel shares for the latest settlement period, for widgets that only need
/// percentages.
pub async fn fuel_mix_handler(State(state): State<AppState>) -> Result<Json<Value>> {
    let date = today(Utc::now());
    let params = day_range(&date, &date);

    let produce = async {
        let rows: Vec<GenerationRecord> = state.fetch_rows(paths::GENERATION, &params).await?;
        let mix = FuelMix::build(&rows, &date)
            .ok_or_else(|| ProxyError::NoData("No data".to_string()))?;
        to_json(&mix)
    };

    state
        .cached("fuel-mix/latest".to_string(), TtlClass::Generation, produce)
        .await
}

/// Handler for GET /api/summary
///
/// Every dashboard KPI in one call. The five datasets are fetched
/// concurrently; a failed fetch drops its section and is listed in `_errors`.
pub async fn summary_handler(State(state): State<AppState>) -> Result<Json<Value>> {
    let produce = async {
        let now = Utc::now();
        let date = today(now);
        let day = day_range(&date, &date);
        let price_params = vec![("settlementDate".to_string(), date.clone())];
        let freq_params = vec![(
            "publishDateTimeFrom".to_string(),
            frequency_window_start(now),
        )];

        let (generation, demand, price, imbalance, frequency) = tokio::join!(
            state.fetch_rows::<GenerationRecord>(paths::GENERATION, &day),
            state.fetch_rows::<DemandRecord>(paths::DEMAND, &day),
            state.fetch_rows::<PriceRecord>(paths::MARKET_INDEX_PRICE, &price_params),
            state.fetch_rows::<ImbalanceRecord>(paths::IMBALANCE, &day),
            state.fetch_rows::<FrequencyRecord>(paths::FREQUENCY, &freq_params),
        );

        let mut summary = Summary::new(current_settlement_period(now));
        summary.generation = summary.section("generation", generation, GenerationSummary::build);
        summary.demand = summary.section("demand", demand, DemandSummary::build);
        summary.price = summary.section("price", price, PriceSummary::build);
        summary.imbalance = summary.section("imbalance", imbalance, ImbalanceSummary::build);
        summary.frequency = summary.section("frequency", frequency, FrequencySummary::build);

        to_json(&summary)
    };

    state
        .cached("summary".to_string(), TtlClass::Summary, produce)
        .await
}

/// Handler for GET /api/raw/*path
///
/// Passes any upstream path through with the client's query parameters,
/// e.g. `/api/raw/datasets/BOAL?settlementDate=2025-02-17`.
pub async fn raw_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    params: std::result::Result<Query<BTreeMap<String, String>>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(params) = params?;
    let path = split_path(&path)?.join("/");

    let key = cache_key(&format!("raw/{}", path), &params);
    let upstream_params: Vec<(String, String)> = params.into_iter().collect();

    state
        .cached(key, TtlClass::Raw, state.upstream.fetch(&path, &upstream_params))
        .await
}

/// Handler for GET /api/raw/ with nothing after the prefix.
pub async fn raw_empty_handler() -> ProxyError {
    ProxyError::BadRequest("upstream path is required".to_string())
}

/// Handler for GET /api/cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let cache = state.cache.read().await;
    Json(CacheStatsResponse::new(cache.snapshot(), &cache.stats()))
}

/// Handler for POST /api/cache/clear
///
/// Drops one key when `?key=` is given, otherwise every key.
pub async fn cache_clear_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<ClearQuery>, QueryRejection>,
) -> Result<Json<ClearResponse>> {
    let Query(query) = query?;
    let mut cache = state.cache.write().await;

    match query.key {
        Some(key) => {
            let found = cache.remove(&key);
            info!(key = %key, found, "cache key cleared");
            Ok(Json(ClearResponse::key(key, found)))
        }
        None => {
            let count = cache.clear();
            info!(count, "cache cleared");
            Ok(Json(ClearResponse::all(count)))
        }
    }
}

/// Fallback for unknown routes.
pub async fn not_found_handler() -> ProxyError {
    ProxyError::RouteNotFound
}
