//! Vitalog REST API
//!
//! HTTP API layer, built with Axum.
//!
//! # Endpoints
//!
//! ## Ingest
//! - `POST /api/v1/ingest/:metric_type` - One device-sync payload
//!
//! ## Check-in
//! - `POST /api/v1/checkin` - Submit today's ratings
//! - `GET /api/v1/checkin/latest` - Today's check-in
//! - `GET /api/v1/checkin/history` - Check-in history
//!
//! ## Views
//! - `GET /api/v1/dashboard/today` - Today's joined view
//! - `GET /api/v1/trends/week` - 7-day trend series
//! - `GET /api/v1/insights/correlations` - Correlation insights
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let max_body_size = state.config.max_body_size;

    let api_routes = Router::new()
        .route("/ingest/:metric_type", post(routes::ingest::ingest_metric))
        .route("/checkin", post(routes::checkin::submit_checkin))
        .route("/checkin/latest", get(routes::checkin::latest_checkin))
        .route("/checkin/history", get(routes::checkin::checkin_history))
        .route("/dashboard/today", get(routes::insights::dashboard_today))
        .route("/trends/week", get(routes::insights::week_trends))
        .route(
            "/insights/correlations",
            get(routes::insights::correlations),
        )
        .layer(DefaultBodyLimit::max(max_body_size));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Vitalog API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Vitalog API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EventStore;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let store = Arc::new(EventStore::in_memory().unwrap());
        let state = AppState::new(store, ApiConfig::default());
        build_router(state)
    }

    fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ingest_created_then_refreshed() {
        let app = create_test_app();

        let payload = serde_json::json!({
            "user_id": "u1",
            "date": "2026-01-28",
            "sleep_data": {"sleep_time_seconds": 28800}
        });

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/ingest/sleep",
                payload.clone(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        // Same identity again: refreshed, not duplicated
        let response = app
            .oneshot(json_request(Method::POST, "/api/v1/ingest/sleep", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ingest_unknown_metric_type() {
        let app = create_test_app();

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/v1/ingest/blood_type",
                serde_json::json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ingest_invalid_payload() {
        let app = create_test_app();

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/v1/ingest/sleep",
                serde_json::json!({
                    "user_id": "u1",
                    "date": "2026-01-28",
                    "sleep_data": {"sleep_time_seconds": 0}
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_checkin_round_trip() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/checkin",
                serde_json::json!({
                    "user_id": "u1",
                    "energy": 7, "mood": 8, "focus": 6, "physical": 7
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/checkin/latest?user_id=u1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_checkin_rejects_out_of_range_rating() {
        let app = create_test_app();

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/v1/checkin",
                serde_json::json!({
                    "user_id": "u1",
                    "energy": 11, "mood": 8, "focus": 6, "physical": 7
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dashboard_and_correlations_empty_store() {
        let app = create_test_app();

        for uri in [
            "/api/v1/dashboard/today?user_id=u1",
            "/api/v1/trends/week?user_id=u1",
            "/api/v1/insights/correlations?user_id=u1&days=30",
        ] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "uri {}", uri);
        }
    }
}
