//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use crate::insight::{CorrelationInsight, TrendPoint};
use crate::model::payload::SubjectiveFeeling;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// INGEST DTOs
// ============================================

/// Ingest response for device-sync and check-in submissions
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    /// Status: "success"
    pub status: String,
    /// True when a new row was created; false when an existing identity
    /// was refreshed
    pub was_inserted: bool,
}

impl IngestResponse {
    pub fn new(was_inserted: bool) -> Self {
        Self {
            status: "success".to_string(),
            was_inserted,
        }
    }
}

// ============================================
// CHECK-IN DTOs
// ============================================

/// Query parameters identifying the requesting user
///
/// Authentication is handled upstream; handlers trust this identifier.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

/// Query parameters for history-style endpoints
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: String,
    /// Trailing window in days, default 30
    #[serde(default)]
    pub days: Option<i64>,
}

impl HistoryQuery {
    pub fn days(&self) -> i64 {
        self.days.filter(|d| *d > 0).unwrap_or(30)
    }
}

/// Today's check-in, if one exists
#[derive(Debug, Serialize)]
pub struct LatestCheckinResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub checkin: Option<SubjectiveFeeling>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// One day in the check-in history
#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub date: NaiveDate,
    pub checkin: SubjectiveFeeling,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub status: String,
    pub count: usize,
    pub history: Vec<HistoryItem>,
}

// ============================================
// INSIGHT DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub status: String,
    pub count: usize,
    pub trends: Vec<TrendPoint>,
}

#[derive(Debug, Serialize)]
pub struct CorrelationsResponse {
    pub status: String,
    pub count: usize,
    pub period_days: i64,
    pub correlations: Vec<CorrelationInsight>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "unhealthy"
    pub status: String,
    /// Storage component status: "ok" or "error"
    pub storage: String,
    /// Total events stored, when storage is reachable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_stored: Option<i64>,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Crate version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_query_defaults() {
        let q = HistoryQuery {
            user_id: "u1".to_string(),
            days: None,
        };
        assert_eq!(q.days(), 30);

        let q = HistoryQuery {
            user_id: "u1".to_string(),
            days: Some(-3),
        };
        assert_eq!(q.days(), 30);

        let q = HistoryQuery {
            user_id: "u1".to_string(),
            days: Some(7),
        };
        assert_eq!(q.days(), 7);
    }
}
