//! Typed per-event payloads
//!
//! One struct per event type, matching the persisted JSON shape exactly.
//! Field names and units (minutes, meters, 1-10 ratings) are part of the
//! stored-data compatibility contract and must not change.

use serde::{Deserialize, Serialize};

/// Payload for `EventType::Sleep`. All durations in minutes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SleepData {
    pub duration_minutes: i64,
    #[serde(default)]
    pub deep_sleep_minutes: i64,
    #[serde(default)]
    pub light_sleep_minutes: i64,
    #[serde(default)]
    pub rem_sleep_minutes: i64,
    #[serde(default)]
    pub awake_minutes: i64,
    #[serde(default)]
    pub sleep_score: i64,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub hrv_avg: f64,
}

/// Payload for `EventType::Activity`. Distance in meters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActivityData {
    pub activity_type: String,
    pub duration_minutes: i64,
    #[serde(default)]
    pub calories: i64,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub avg_hr: i64,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub max_hr: i64,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub distance: f64,
}

/// Payload for `EventType::Hrv`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HrvData {
    pub average_hrv: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hrv: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_hrv: Option<f64>,
}

/// Payload for `EventType::Stress`. Levels on the 0-100 device scale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StressData {
    pub average_stress_level: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stress_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_stress_duration: Option<f64>,
}

/// Payload for `EventType::DailyStats`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DailyStatsData {
    pub steps: i64,
    #[serde(default)]
    pub calories: i64,
    #[serde(default)]
    pub distance_meters: i64,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub active_calories: i64,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub bmr_calories: i64,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub min_heart_rate: i64,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub max_heart_rate: i64,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub resting_heart_rate: i64,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub moderate_intensity_minutes: i64,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub vigorous_intensity_minutes: i64,
}

/// Payload for `EventType::BodyBattery`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BodyBatteryData {
    pub charged: i64,
    pub drained: i64,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub highest_value: i64,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub lowest_value: i64,
}

/// Payload for `EventType::SubjectiveFeeling`. Ratings on a 1-10 scale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubjectiveFeeling {
    pub energy: i64,
    pub mood: i64,
    pub focus: i64,
    pub physical: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

fn is_zero_i64(v: &i64) -> bool {
    *v == 0
}

fn is_zero_f64(v: &f64) -> bool {
    *v == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_data_field_names() {
        let sleep = SleepData {
            duration_minutes: 480,
            deep_sleep_minutes: 90,
            light_sleep_minutes: 240,
            rem_sleep_minutes: 120,
            awake_minutes: 30,
            sleep_score: 85,
            hrv_avg: 52.5,
        };

        let json = serde_json::to_value(&sleep).unwrap();
        assert_eq!(json["duration_minutes"], 480);
        assert_eq!(json["sleep_score"], 85);
        assert_eq!(json["hrv_avg"], 52.5);
    }

    #[test]
    fn test_sleep_data_tolerates_missing_optionals() {
        let sleep: SleepData =
            serde_json::from_value(serde_json::json!({"duration_minutes": 300})).unwrap();
        assert_eq!(sleep.duration_minutes, 300);
        assert_eq!(sleep.sleep_score, 0);
    }

    #[test]
    fn test_hrv_data_skips_absent_bounds() {
        let hrv = HrvData {
            average_hrv: 48.0,
            max_hrv: None,
            min_hrv: None,
        };
        let json = serde_json::to_string(&hrv).unwrap();
        assert!(!json.contains("max_hrv"));
        assert!(!json.contains("min_hrv"));
    }

    #[test]
    fn test_feeling_skips_empty_notes() {
        let feeling = SubjectiveFeeling {
            energy: 7,
            mood: 8,
            focus: 6,
            physical: 7,
            notes: String::new(),
        };
        let json = serde_json::to_string(&feeling).unwrap();
        assert!(!json.contains("notes"));
        assert!(json.contains("\"energy\":7"));
    }
}
