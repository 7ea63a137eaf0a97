//! Read-side views for the dashboard and trend endpoints
//!
//! Thin formatting over stored events. Payloads that no longer decode are
//! dropped from the view instead of failing the request.

use crate::model::payload::{
    ActivityData, BodyBatteryData, DailyStatsData, HrvData, SleepData, StressData,
    SubjectiveFeeling,
};
use crate::model::{Event, EventType};
use crate::store::types::local_date_of;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Today's check-in joined with device data
#[derive(Debug, Default, Serialize)]
pub struct DashboardView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin: Option<SubjectiveFeeling>,
    pub device: DeviceSummary,
}

/// Today's device-sync data, one slot per metric family
#[derive(Debug, Default, Serialize)]
pub struct DeviceSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep: Option<SleepData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hrv: Option<HrvSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress: Option<StressSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_stats: Option<DailyStatsData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_battery: Option<BodyBatteryData>,
}

#[derive(Debug, Serialize)]
pub struct HrvSummary {
    pub average: f64,
}

#[derive(Debug, Serialize)]
pub struct StressSummary {
    pub average: i64,
    /// low, moderate, or high
    pub level: &'static str,
}

fn stress_level(average: i64) -> &'static str {
    match average {
        a if a > 50 => "high",
        a if a >= 26 => "moderate",
        _ => "low",
    }
}

/// One calendar day in the weekly trend series
#[derive(Debug, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin: Option<SubjectiveFeeling>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep: Option<SleepData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityData>,
}

/// Build the dashboard view from today's events, newest first
///
/// The first decodable event per slot wins, so a newest-first input keeps
/// the most recent record.
pub fn dashboard_view(events: &[Event]) -> DashboardView {
    let mut view = DashboardView::default();

    for event in events {
        match event.event_type {
            EventType::SubjectiveFeeling if view.checkin.is_none() => {
                view.checkin = event.decode_data().ok();
            }
            EventType::Sleep if view.device.sleep.is_none() => {
                view.device.sleep = event.decode_data().ok();
            }
            EventType::Activity if view.device.activity.is_none() => {
                view.device.activity = event.decode_data().ok();
            }
            EventType::Hrv if view.device.hrv.is_none() => {
                view.device.hrv = event
                    .decode_data::<HrvData>()
                    .ok()
                    .map(|h| HrvSummary {
                        average: h.average_hrv,
                    });
            }
            EventType::Stress if view.device.stress.is_none() => {
                view.device.stress = event.decode_data::<StressData>().ok().map(|s| {
                    let average = s.average_stress_level as i64;
                    StressSummary {
                        average,
                        level: stress_level(average),
                    }
                });
            }
            EventType::DailyStats if view.device.daily_stats.is_none() => {
                view.device.daily_stats = event.decode_data().ok();
            }
            EventType::BodyBattery if view.device.body_battery.is_none() => {
                view.device.body_battery = event.decode_data().ok();
            }
            _ => {}
        }
    }

    view
}

/// Group events into per-day trend points, oldest date first
pub fn trend_points(events: &[Event]) -> Vec<TrendPoint> {
    let mut ordered: Vec<&Event> = events.iter().collect();
    ordered.sort_by_key(|e| e.time);

    let mut by_date: BTreeMap<NaiveDate, TrendPoint> = BTreeMap::new();
    for event in ordered {
        let date = local_date_of(event.time);
        let point = by_date.entry(date).or_insert_with(|| TrendPoint {
            date,
            checkin: None,
            sleep: None,
            activity: None,
        });

        match event.event_type {
            EventType::SubjectiveFeeling => {
                if let Ok(feeling) = event.decode_data() {
                    point.checkin = Some(feeling);
                }
            }
            EventType::Sleep => {
                if let Ok(sleep) = event.decode_data() {
                    point.sleep = Some(sleep);
                }
            }
            EventType::Activity => {
                if let Ok(activity) = event.decode_data() {
                    point.activity = Some(activity);
                }
            }
            _ => {}
        }
    }

    by_date.into_values().collect()
}
