//! Ingest Routes
//!
//! Endpoint for device-sync payloads, one metric family per request.
//!
//! - POST /api/v1/ingest/:metric_type

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::str::FromStr;
use std::sync::Arc;

use crate::api::dto::IngestResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::model::EventType;
use crate::normalize;

/// POST /api/v1/ingest/:metric_type
///
/// Normalize one external payload and upsert the resulting event. A repeat
/// submission for the same day refreshes the stored record and reports
/// `was_inserted: false`.
pub async fn ingest_metric(
    State(state): State<Arc<AppState>>,
    Path(metric_type): Path<String>,
    Json(raw): Json<serde_json::Value>,
) -> ApiResult<(StatusCode, Json<IngestResponse>)> {
    let event_type = EventType::from_str(&metric_type)
        .map_err(|e| ApiError::Validation(normalize::ValidationError::Malformed(e.to_string())))?;

    let event = normalize::normalize(event_type, &raw)?;
    let outcome = state.store.upsert(&event).await?;

    tracing::info!(
        user_id = %event.user_id,
        event_type = %event.event_type,
        was_inserted = outcome.inserted,
        "ingested event"
    );

    let status = if outcome.inserted {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(IngestResponse::new(outcome.inserted))))
}
