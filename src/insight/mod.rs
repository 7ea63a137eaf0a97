//! Insight engine
//!
//! Turns a user's stored event stream into day-level aggregates and simple
//! two-cohort comparisons. Nothing here is persisted; every request
//! recomputes from the store. This is a heuristic engine with fixed
//! thresholds and fixed confidence labels, not statistical inference.

pub mod correlations;
pub mod views;

pub use correlations::{correlation_insights, CorrelationInsight};
pub use views::{dashboard_view, trend_points, DashboardView, DeviceSummary, TrendPoint};

use crate::model::payload::{ActivityData, SleepData, SubjectiveFeeling};
use crate::model::{Event, EventType};
use crate::store::types::local_date_of;
use crate::store::{EventStore, StoreResult, TimeRange};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One user-day's worth of signals: at most one feeling, sleep, and
/// activity record
#[derive(Debug, Clone, Default, Serialize)]
pub struct DailyAggregate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feeling: Option<SubjectiveFeeling>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep: Option<SleepData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityData>,
}

/// Aggregates plus the insights derived from them, for one window
#[derive(Debug, Serialize)]
pub struct InsightReport {
    pub daily: BTreeMap<NaiveDate, DailyAggregate>,
    pub insights: Vec<CorrelationInsight>,
}

/// Group events by the local calendar date of their time
///
/// Events whose payload no longer decodes are skipped rather than failing
/// the whole aggregation. When a date holds several events of one type the
/// latest wins.
pub fn daily_aggregates(events: &[Event]) -> BTreeMap<NaiveDate, DailyAggregate> {
    let mut ordered: Vec<&Event> = events.iter().collect();
    ordered.sort_by_key(|e| e.time);

    let mut days: BTreeMap<NaiveDate, DailyAggregate> = BTreeMap::new();
    for event in ordered {
        let day = days.entry(local_date_of(event.time)).or_default();
        match event.event_type {
            EventType::SubjectiveFeeling => {
                if let Ok(feeling) = event.decode_data() {
                    day.feeling = Some(feeling);
                }
            }
            EventType::Sleep => {
                if let Ok(sleep) = event.decode_data() {
                    day.sleep = Some(sleep);
                }
            }
            EventType::Activity => {
                if let Ok(activity) = event.decode_data() {
                    day.activity = Some(activity);
                }
            }
            _ => {}
        }
    }
    days
}

/// Read-side engine over the event store
pub struct InsightEngine {
    store: Arc<EventStore>,
}

impl InsightEngine {
    pub fn new(store: Arc<EventStore>) -> Self {
        Self { store }
    }

    /// Daily aggregates and correlation insights over a caller-specified
    /// window
    pub async fn compute(&self, user_id: &str, window: TimeRange) -> StoreResult<InsightReport> {
        let events = self.store.query_by_user(user_id, window).await?;
        let daily = daily_aggregates(&events);
        let insights = correlation_insights(&daily);
        tracing::debug!(
            user_id,
            days = daily.len(),
            insights = insights.len(),
            "computed insight report"
        );
        Ok(InsightReport { daily, insights })
    }

    /// Correlation insights over the trailing `days` window
    pub async fn correlations(
        &self,
        user_id: &str,
        days: i64,
    ) -> StoreResult<Vec<CorrelationInsight>> {
        let report = self.compute(user_id, TimeRange::last_days(days)).await?;
        Ok(report.insights)
    }

    /// Today's check-in and device data, joined into one view
    pub async fn dashboard_today(&self, user_id: &str) -> StoreResult<DashboardView> {
        let events = self.store.query_by_user(user_id, TimeRange::today()).await?;
        Ok(dashboard_view(&events))
    }

    /// Per-day trend points for the last 7 days including today
    pub async fn week_trends(&self, user_id: &str) -> StoreResult<Vec<TrendPoint>> {
        let events = self
            .store
            .query_by_user(user_id, TimeRange::last_days(6))
            .await?;
        Ok(trend_points(&events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Source;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn event(day: u32, hour: u32, event_type: EventType, data: serde_json::Value) -> Event {
        Event::new(
            Utc.with_ymd_and_hms(2026, 1, day, hour, 0, 0).unwrap(),
            "u1",
            event_type,
            Source::DeviceSync,
            data,
        )
    }

    #[test]
    fn test_aggregates_group_by_date() {
        let events = vec![
            event(5, 8, EventType::Sleep, json!({"duration_minutes": 450})),
            event(
                5,
                12,
                EventType::Activity,
                json!({"activity_type": "run", "duration_minutes": 40}),
            ),
            event(6, 8, EventType::Sleep, json!({"duration_minutes": 400})),
        ];

        let days = daily_aggregates(&events);
        assert_eq!(days.len(), 2);

        let jan5 = &days[&local_date_of(events[0].time)];
        assert!(jan5.sleep.is_some());
        assert!(jan5.activity.is_some());
        assert!(jan5.feeling.is_none());
    }

    #[test]
    fn test_latest_event_wins_within_a_day() {
        let events = vec![
            event(5, 14, EventType::Sleep, json!({"duration_minutes": 480})),
            event(5, 8, EventType::Sleep, json!({"duration_minutes": 100})),
        ];

        let days = daily_aggregates(&events);
        let day = days.values().next().unwrap();
        assert_eq!(day.sleep.as_ref().unwrap().duration_minutes, 480);
    }

    #[test]
    fn test_undecodable_payload_is_skipped() {
        let events = vec![event(5, 8, EventType::Sleep, json!("not an object"))];
        let days = daily_aggregates(&events);
        assert!(days.values().next().unwrap().sleep.is_none());
    }

    #[tokio::test]
    async fn test_compute_reads_through_the_store() {
        let store = Arc::new(EventStore::in_memory().unwrap());
        store
            .upsert(&event(5, 8, EventType::Sleep, json!({"duration_minutes": 450})))
            .await
            .unwrap();

        let engine = InsightEngine::new(store);
        let window = TimeRange::inclusive(
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 31, 0, 0, 0).unwrap(),
        );
        let report = engine.compute("u1", window).await.unwrap();
        assert_eq!(report.daily.len(), 1);
        assert!(report.insights.is_empty());
    }
}
