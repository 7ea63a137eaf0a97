//! Normalizers for device-sync payloads
//!
//! The sync job posts one envelope per metric family: `user_id`, a
//! `YYYY-MM-DD` calendar date, and an untyped data object under a
//! family-specific key. Validation mirrors what the sync job can actually
//! guarantee: required fields fail hard, while optional timestamps that do
//! not parse silently fall back to the family's default time-of-day.

use crate::model::payload::{
    ActivityData, BodyBatteryData, DailyStatsData, HrvData, SleepData, StressData,
};
use crate::model::{Event, EventType, Source};
use crate::normalize::{secs_to_minutes, RawPayload, ValidationError};
use crate::store::types::{at_local_hour, local_day_start};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Envelope posted by the sync job. Exactly one of the data objects is
/// populated, matching the metric type of the ingestion endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SyncPayload {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub sleep_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub activity_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub hrv_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub stress_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub daily_stats_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub body_battery_data: Option<Map<String, Value>>,
}

impl SyncPayload {
    /// Validate the envelope fields shared by every metric family
    fn envelope(&self) -> Result<NaiveDate, ValidationError> {
        if self.user_id.is_empty() {
            return Err(ValidationError::Required("user_id"));
        }
        if self.date.is_empty() {
            return Err(ValidationError::Required("date"));
        }
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|_| ValidationError::BadDate)
    }

    fn data<'a>(
        &'a self,
        field: &'a Option<Map<String, Value>>,
        name: &'static str,
    ) -> Result<RawPayload<'a>, ValidationError> {
        field
            .as_ref()
            .map(RawPayload::new)
            .ok_or(ValidationError::Required(name))
    }
}

/// Dispatch a sync envelope to the normalizer for its metric family
pub fn normalize_sync(
    metric_type: EventType,
    payload: &SyncPayload,
) -> Result<Event, ValidationError> {
    match metric_type {
        EventType::Sleep => normalize_sleep(payload),
        EventType::Activity => normalize_activity(payload),
        EventType::Hrv => normalize_hrv(payload),
        EventType::Stress => normalize_stress(payload),
        EventType::DailyStats => normalize_daily_stats(payload),
        EventType::BodyBattery => normalize_body_battery(payload),
        other => Err(ValidationError::Unsupported(other)),
    }
}

/// Optional RFC 3339 timestamp; parse failure falls back to the default
fn timestamp_or(raw: RawPayload<'_>, key: &str, fallback: DateTime<Utc>) -> DateTime<Utc> {
    raw.str(key)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(fallback)
}

pub fn normalize_sleep(payload: &SyncPayload) -> Result<Event, ValidationError> {
    let date = payload.envelope()?;
    let raw = payload.data(&payload.sleep_data, "sleep_data")?;

    let sleep_seconds = raw
        .num("sleep_time_seconds")
        .filter(|v| *v > 0.0)
        .ok_or(ValidationError::Positive("sleep_time_seconds"))?;

    // Nights without an end timestamp are pinned to 08:00 local
    let time = timestamp_or(raw, "sleep_end_timestamp_gmt", at_local_hour(date, 8));

    let data = SleepData {
        duration_minutes: secs_to_minutes(sleep_seconds),
        deep_sleep_minutes: secs_to_minutes(raw.num_or_zero("deep_sleep_seconds")),
        light_sleep_minutes: secs_to_minutes(raw.num_or_zero("light_sleep_seconds")),
        rem_sleep_minutes: secs_to_minutes(raw.num_or_zero("rem_sleep_seconds")),
        awake_minutes: secs_to_minutes(raw.num_or_zero("awake_seconds")),
        sleep_score: raw
            .object("sleep_scores")
            .map(|scores| scores.num_or_zero("overall_score") as i64)
            .unwrap_or(0),
        hrv_avg: raw.num_or_zero("average_hrv"),
    };

    Ok(Event::new(
        time,
        &payload.user_id,
        EventType::Sleep,
        Source::DeviceSync,
        serde_json::to_value(&data)?,
    ))
}

pub fn normalize_activity(payload: &SyncPayload) -> Result<Event, ValidationError> {
    let date = payload.envelope()?;
    let raw = payload.data(&payload.activity_data, "activity_data")?;

    let activity_type = raw
        .str("activity_type")
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::NonEmptyString("activity_type"))?;

    let duration_seconds = raw
        .num("duration_seconds")
        .filter(|v| *v > 0.0)
        .ok_or(ValidationError::Positive("duration_seconds"))?;

    let time = timestamp_or(raw, "start_time_gmt", at_local_hour(date, 12));

    let data = ActivityData {
        activity_type: activity_type.to_string(),
        duration_minutes: secs_to_minutes(duration_seconds),
        calories: raw.num_or_zero("calories") as i64,
        avg_hr: raw.num_or_zero("average_heart_rate") as i64,
        max_hr: raw.num_or_zero("max_heart_rate") as i64,
        distance: raw.num_or_zero("distance_meters"),
    };

    Ok(Event::new(
        time,
        &payload.user_id,
        EventType::Activity,
        Source::DeviceSync,
        serde_json::to_value(&data)?,
    ))
}

pub fn normalize_hrv(payload: &SyncPayload) -> Result<Event, ValidationError> {
    let date = payload.envelope()?;
    let raw = payload.data(&payload.hrv_data, "hrv_data")?;

    let average_hrv = raw
        .num("average_hrv")
        .filter(|v| *v >= 0.0)
        .ok_or(ValidationError::NonNegative("average_hrv"))?;

    let data = HrvData {
        average_hrv,
        max_hrv: raw.num("max_hrv"),
        min_hrv: raw.num("min_hrv"),
    };

    Ok(Event::new(
        local_day_start(date),
        &payload.user_id,
        EventType::Hrv,
        Source::DeviceSync,
        serde_json::to_value(&data)?,
    ))
}

pub fn normalize_stress(payload: &SyncPayload) -> Result<Event, ValidationError> {
    let date = payload.envelope()?;
    let raw = payload.data(&payload.stress_data, "stress_data")?;

    // The level is optional, but when present it must sit on the 0-100 scale
    if let Some(level) = raw.num("average_stress_level") {
        if !(0.0..=100.0).contains(&level) {
            return Err(ValidationError::OutOfRange {
                field: "average_stress_level",
                min: 0,
                max: 100,
                got: level as i64,
            });
        }
    }

    let data = StressData {
        average_stress_level: raw.num_or_zero("average_stress_level"),
        max_stress_level: raw.num("max_stress_level"),
        rest_stress_duration: raw.num("rest_stress_duration"),
    };

    Ok(Event::new(
        local_day_start(date),
        &payload.user_id,
        EventType::Stress,
        Source::DeviceSync,
        serde_json::to_value(&data)?,
    ))
}

pub fn normalize_daily_stats(payload: &SyncPayload) -> Result<Event, ValidationError> {
    let date = payload.envelope()?;
    let raw = payload.data(&payload.daily_stats_data, "daily_stats_data")?;

    let steps = raw
        .num("steps")
        .filter(|v| *v >= 0.0)
        .ok_or(ValidationError::NonNegative("steps"))?;

    let data = DailyStatsData {
        steps: steps as i64,
        calories: raw.num_or_zero("calories") as i64,
        distance_meters: raw.num_or_zero("distance_meters") as i64,
        active_calories: raw.num_or_zero("active_calories") as i64,
        bmr_calories: raw.num_or_zero("bmr_calories") as i64,
        min_heart_rate: raw.num_or_zero("min_heart_rate") as i64,
        max_heart_rate: raw.num_or_zero("max_heart_rate") as i64,
        resting_heart_rate: raw.num_or_zero("resting_heart_rate") as i64,
        moderate_intensity_minutes: raw.num_or_zero("moderate_intensity_minutes") as i64,
        vigorous_intensity_minutes: raw.num_or_zero("vigorous_intensity_minutes") as i64,
    };

    Ok(Event::new(
        local_day_start(date),
        &payload.user_id,
        EventType::DailyStats,
        Source::DeviceSync,
        serde_json::to_value(&data)?,
    ))
}

pub fn normalize_body_battery(payload: &SyncPayload) -> Result<Event, ValidationError> {
    let date = payload.envelope()?;
    let raw = payload.data(&payload.body_battery_data, "body_battery_data")?;

    let charged = raw.num("charged");
    let drained = raw.num("drained");

    // Either value alone is enough, but "both missing" and "both negative"
    // mean the sync produced nothing usable
    let both_missing = charged.is_none() && drained.is_none();
    let both_negative = charged.unwrap_or(0.0) < 0.0 && drained.unwrap_or(0.0) < 0.0;
    if both_missing || both_negative {
        return Err(ValidationError::ChargedOrDrained);
    }

    let data = BodyBatteryData {
        charged: charged.unwrap_or(0.0) as i64,
        drained: drained.unwrap_or(0.0) as i64,
        highest_value: raw.num_or_zero("highest_value") as i64,
        lowest_value: raw.num_or_zero("lowest_value") as i64,
    };

    Ok(Event::new(
        local_day_start(date),
        &payload.user_id,
        EventType::BodyBattery,
        Source::DeviceSync,
        serde_json::to_value(&data)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::local_date_of;
    use chrono::Timelike;
    use serde_json::json;

    fn envelope(data_key: &str, data: Value) -> SyncPayload {
        let mut value = json!({"user_id": "u1", "date": "2026-01-28"});
        value[data_key] = data;
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_sleep_requires_positive_duration() {
        let payload = envelope("sleep_data", json!({"sleep_time_seconds": 0}));
        let err = normalize_sleep(&payload).unwrap_err();
        assert_eq!(err, ValidationError::Positive("sleep_time_seconds"));

        let payload = envelope("sleep_data", json!({}));
        assert!(normalize_sleep(&payload).is_err());
    }

    #[test]
    fn test_sleep_duration_floors_to_minutes() {
        let payload = envelope(
            "sleep_data",
            json!({"sleep_time_seconds": 28800, "deep_sleep_seconds": 90}),
        );
        let event = normalize_sleep(&payload).unwrap();
        assert_eq!(event.data["duration_minutes"], 480);
        assert_eq!(event.data["deep_sleep_minutes"], 1);
    }

    #[test]
    fn test_sleep_time_defaults_to_eight_local() {
        let payload = envelope("sleep_data", json!({"sleep_time_seconds": 28800}));
        let event = normalize_sleep(&payload).unwrap();

        let local = event.time.with_timezone(&chrono::Local);
        assert_eq!(
            local.date_naive(),
            NaiveDate::from_ymd_opt(2026, 1, 28).unwrap()
        );
        assert_eq!(local.time().hour(), 8);
    }

    #[test]
    fn test_sleep_end_timestamp_wins_when_parseable() {
        let payload = envelope(
            "sleep_data",
            json!({
                "sleep_time_seconds": 28800,
                "sleep_end_timestamp_gmt": "2026-01-28T06:45:00Z"
            }),
        );
        let event = normalize_sleep(&payload).unwrap();
        assert_eq!(event.time.to_rfc3339(), "2026-01-28T06:45:00+00:00");
    }

    #[test]
    fn test_sleep_unparseable_timestamp_falls_back() {
        let payload = envelope(
            "sleep_data",
            json!({
                "sleep_time_seconds": 28800,
                "sleep_end_timestamp_gmt": "yesterday-ish"
            }),
        );
        let event = normalize_sleep(&payload).unwrap();
        assert_eq!(event.time.with_timezone(&chrono::Local).time().hour(), 8);
    }

    #[test]
    fn test_sleep_score_from_nested_scores() {
        let payload = envelope(
            "sleep_data",
            json!({
                "sleep_time_seconds": 25200,
                "sleep_scores": {"overall_score": 85}
            }),
        );
        let event = normalize_sleep(&payload).unwrap();
        assert_eq!(event.data["sleep_score"], 85);
    }

    #[test]
    fn test_envelope_validation() {
        let payload: SyncPayload = serde_json::from_value(json!({
            "date": "2026-01-28",
            "sleep_data": {"sleep_time_seconds": 100}
        }))
        .unwrap();
        assert_eq!(
            normalize_sleep(&payload).unwrap_err(),
            ValidationError::Required("user_id")
        );

        let payload = SyncPayload {
            user_id: "u1".to_string(),
            date: "01/28/2026".to_string(),
            ..Default::default()
        };
        assert_eq!(
            normalize_sleep(&payload).unwrap_err(),
            ValidationError::BadDate
        );
    }

    #[test]
    fn test_activity_requires_type_and_duration() {
        let payload = envelope("activity_data", json!({"duration_seconds": 1800}));
        assert_eq!(
            normalize_activity(&payload).unwrap_err(),
            ValidationError::NonEmptyString("activity_type")
        );

        let payload = envelope(
            "activity_data",
            json!({"activity_type": "running", "duration_seconds": 0}),
        );
        assert_eq!(
            normalize_activity(&payload).unwrap_err(),
            ValidationError::Positive("duration_seconds")
        );
    }

    #[test]
    fn test_activity_defaults_to_noon_local() {
        let payload = envelope(
            "activity_data",
            json!({"activity_type": "cycling", "duration_seconds": 3600}),
        );
        let event = normalize_activity(&payload).unwrap();
        assert_eq!(event.time.with_timezone(&chrono::Local).time().hour(), 12);
        assert_eq!(event.data["duration_minutes"], 60);
        assert_eq!(event.data["activity_type"], "cycling");
    }

    #[test]
    fn test_hrv_rejects_negative_average() {
        let payload = envelope("hrv_data", json!({"average_hrv": -1}));
        assert_eq!(
            normalize_hrv(&payload).unwrap_err(),
            ValidationError::NonNegative("average_hrv")
        );

        let payload = envelope("hrv_data", json!({"average_hrv": 0}));
        let event = normalize_hrv(&payload).unwrap();
        assert_eq!(event.data["average_hrv"], 0.0);
        assert_eq!(
            local_date_of(event.time),
            NaiveDate::from_ymd_opt(2026, 1, 28).unwrap()
        );
    }

    #[test]
    fn test_stress_range_only_checked_when_present() {
        for bad in [-1.0, 101.0, 150.0] {
            let payload = envelope("stress_data", json!({"average_stress_level": bad}));
            assert!(normalize_stress(&payload).is_err(), "level {}", bad);
        }

        for ok in [0.0, 100.0] {
            let payload = envelope("stress_data", json!({"average_stress_level": ok}));
            assert!(normalize_stress(&payload).is_ok(), "level {}", ok);
        }

        // Absent level is permitted
        let payload = envelope("stress_data", json!({"rest_stress_duration": 480}));
        let event = normalize_stress(&payload).unwrap();
        assert_eq!(event.data["average_stress_level"], 0.0);
        assert_eq!(event.data["rest_stress_duration"], 480.0);
    }

    #[test]
    fn test_daily_stats_requires_non_negative_steps() {
        let payload = envelope("daily_stats_data", json!({"steps": -5}));
        assert!(normalize_daily_stats(&payload).is_err());

        let payload = envelope(
            "daily_stats_data",
            json!({"steps": 10432, "distance_meters": 8200.7}),
        );
        let event = normalize_daily_stats(&payload).unwrap();
        assert_eq!(event.data["steps"], 10432);
        assert_eq!(event.data["distance_meters"], 8200);
    }

    #[test]
    fn test_body_battery_corner_cases() {
        // Both present, both negative: invalid
        let payload = envelope("body_battery_data", json!({"charged": -1, "drained": -1}));
        assert_eq!(
            normalize_body_battery(&payload).unwrap_err(),
            ValidationError::ChargedOrDrained
        );

        // Both missing: invalid
        let payload = envelope("body_battery_data", json!({"highest_value": 80}));
        assert!(normalize_body_battery(&payload).is_err());

        // Either valid value alone is sufficient
        let payload = envelope("body_battery_data", json!({"charged": 5}));
        let event = normalize_body_battery(&payload).unwrap();
        assert_eq!(event.data["charged"], 5);
        assert_eq!(event.data["drained"], 0);
    }
}
