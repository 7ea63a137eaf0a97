//! Dashboard, Trend, and Correlation Routes
//!
//! Read-only views over the event store.
//!
//! - GET /api/v1/dashboard/today?user_id=...
//! - GET /api/v1/trends/week?user_id=...
//! - GET /api/v1/insights/correlations?user_id=...&days=30

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CorrelationsResponse, HistoryQuery, TrendsResponse, UserQuery};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::insight::DashboardView;

/// GET /api/v1/dashboard/today
pub async fn dashboard_today(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<DashboardView>> {
    let view = state.insights.dashboard_today(&query.user_id).await?;
    Ok(Json(view))
}

/// GET /api/v1/trends/week
pub async fn week_trends(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<TrendsResponse>> {
    let trends = state.insights.week_trends(&query.user_id).await?;
    Ok(Json(TrendsResponse {
        status: "success".to_string(),
        count: trends.len(),
        trends,
    }))
}

/// GET /api/v1/insights/correlations
pub async fn correlations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<CorrelationsResponse>> {
    let days = query.days();
    let correlations = state.insights.correlations(&query.user_id, days).await?;
    Ok(Json(CorrelationsResponse {
        status: "success".to_string(),
        count: correlations.len(),
        period_days: days,
        correlations,
    }))
}
