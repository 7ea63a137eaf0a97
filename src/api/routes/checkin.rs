//! Check-in Routes
//!
//! Manual daily self-reports and their read-back endpoints.
//!
//! - POST /api/v1/checkin
//! - GET /api/v1/checkin/latest?user_id=...
//! - GET /api/v1/checkin/history?user_id=...&days=30

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{
    HistoryItem, HistoryQuery, HistoryResponse, IngestResponse, LatestCheckinResponse, UserQuery,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::model::EventType;
use crate::normalize::{self, CheckinPayload};
use crate::store::types::local_date_of;
use crate::store::TimeRange;

/// POST /api/v1/checkin
///
/// Submit today's ratings. A second submission on the same day overwrites
/// the first through the store's identity rule.
pub async fn submit_checkin(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CheckinPayload>,
) -> ApiResult<(StatusCode, Json<IngestResponse>)> {
    if payload.user_id.is_empty() {
        return Err(ApiError::Validation(normalize::ValidationError::Required(
            "user_id",
        )));
    }

    let event = normalize::normalize_checkin(&payload.user_id, &payload)?;
    let outcome = state.store.upsert(&event).await?;

    tracing::info!(
        user_id = %event.user_id,
        was_inserted = outcome.inserted,
        "check-in recorded"
    );

    let status = if outcome.inserted {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(IngestResponse::new(outcome.inserted))))
}

/// GET /api/v1/checkin/latest
///
/// Today's check-in, or an empty payload if none was submitted yet.
pub async fn latest_checkin(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<LatestCheckinResponse>> {
    let events = state
        .store
        .query_by_user_and_type(
            &query.user_id,
            EventType::SubjectiveFeeling,
            TimeRange::today(),
        )
        .await?;

    let Some(event) = events.first() else {
        return Ok(Json(LatestCheckinResponse {
            status: "success".to_string(),
            timestamp: None,
            checkin: None,
            message: Some("No check-in for today"),
        }));
    };

    let feeling = event
        .decode_data()
        .map_err(|e| ApiError::Internal(format!("stored check-in no longer decodes: {}", e)))?;

    Ok(Json(LatestCheckinResponse {
        status: "success".to_string(),
        timestamp: Some(event.time),
        checkin: Some(feeling),
        message: None,
    }))
}

/// GET /api/v1/checkin/history
///
/// One entry per check-in over the trailing window, newest first.
/// Records that no longer decode are skipped.
pub async fn checkin_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let events = state
        .store
        .query_by_user_and_type(
            &query.user_id,
            EventType::SubjectiveFeeling,
            TimeRange::last_days(query.days()),
        )
        .await?;

    let history: Vec<HistoryItem> = events
        .iter()
        .filter_map(|event| {
            let checkin = event.decode_data().ok()?;
            Some(HistoryItem {
                date: local_date_of(event.time),
                checkin,
            })
        })
        .collect();

    Ok(Json(HistoryResponse {
        status: "success".to_string(),
        count: history.len(),
        history,
    }))
}
