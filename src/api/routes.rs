//! API Routes
//!
//! Configures the Axum router with all proxy endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_clear_handler, cache_stats_handler, demand_handler, frequency_handler,
    fuel_mix_handler, generation_handler, generation_latest_handler, health_handler,
    imbalance_handler, index_handler, not_found_handler, price_handler, raw_empty_handler,
    raw_handler, settlement_period_handler, summary_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: any origin, so a static dashboard can call the proxy directly
/// - Tracing: logs every request
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/settlement-period", get(settlement_period_handler))
        .route("/api/generation", get(generation_handler))
        .route("/api/generation/latest", get(generation_latest_handler))
        .route("/api/demand", get(demand_handler))
        .route("/api/price", get(price_handler))
        .route("/api/imbalance", get(imbalance_handler))
        .route("/api/frequency", get(frequency_handler))
        .route("/api/fuel-mix/latest", get(fuel_mix_handler))
        .route("/api/summary", get(summary_handler))
        .route("/api/cache/stats", get(cache_stats_handler))
        .route("/api/cache/clear", post(cache_clear_handler))
        .route("/api/raw", get(raw_empty_handler))
        .route("/api/raw/", get(raw_empty_handler))
        .route("/api/raw/*path", get(raw_handler))
        .fallback(not_found_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::config::TtlPolicy;
    use crate::upstream::UpstreamClient;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let upstream = UpstreamClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        create_router(AppState::new(CacheStore::new(100), upstream, TtlPolicy::default()))
    }

    async fn status_of(app: Router, method: &str, uri: &str) -> StatusCode {
        app.oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
    }

    #[tokio::test]
    async fn test_local_endpoints() {
        let app = create_test_app();

        assert_eq!(status_of(app.clone(), "GET", "/").await, StatusCode::OK);
        assert_eq!(status_of(app.clone(), "GET", "/health").await, StatusCode::OK);
        assert_eq!(
            status_of(app.clone(), "GET", "/api/settlement-period").await,
            StatusCode::OK
        );
        assert_eq!(
            status_of(app, "GET", "/api/cache/stats").await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = create_test_app();
        assert_eq!(
            status_of(app, "GET", "/api/does-not-exist").await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_clear_requires_post() {
        let app = create_test_app();

        assert_eq!(
            status_of(app.clone(), "GET", "/api/cache/clear").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            status_of(app, "POST", "/api/cache/clear").await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_raw_without_path_is_400() {
        let app = create_test_app();

        assert_eq!(
            status_of(app.clone(), "GET", "/api/raw/").await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(app, "GET", "/api/raw").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_duplicate_query_param_is_400() {
        let app = create_test_app();
        assert_eq!(
            status_of(app, "GET", "/api/demand?date=2025-02-17&date=2025-02-18").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_bad_date_is_400() {
        let app = create_test_app();
        assert_eq!(
            status_of(app, "GET", "/api/price?date=tomorrow").await,
            StatusCode::BAD_REQUEST
        );
    }
}
