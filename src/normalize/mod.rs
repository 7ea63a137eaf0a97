//! Payload normalizers
//!
//! Each normalizer converts one externally-shaped daily payload into a
//! canonical [`Event`]. Normalizers are pure: no I/O, and the only failure
//! mode is a [`ValidationError`] raised before any transformation happens.
//!
//! External payloads are loosely typed. Numbers may arrive as integer or
//! floating-point JSON, so every numeric lookup goes through [`RawPayload`],
//! which coerces to `f64` and treats a missing key as 0.0 unless validation
//! explicitly requires presence.

pub mod checkin;
pub mod garmin;

pub use checkin::{normalize_checkin, CheckinPayload};
pub use garmin::SyncPayload;

use crate::model::{Event, EventType};
use serde_json::{Map, Value};
use thiserror::Error;

/// Malformed or out-of-range input. Always surfaced to the caller, never
/// retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("date must be in YYYY-MM-DD format")]
    BadDate,

    #[error("{0} must be a positive number")]
    Positive(&'static str),

    #[error("{0} must be a non-negative number")]
    NonNegative(&'static str),

    #[error("{0} must be a non-empty string")]
    NonEmptyString(&'static str),

    #[error("{field} must be between {min} and {max}, got {got}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        got: i64,
    },

    #[error("notes cannot exceed {0} characters")]
    NotesTooLong(usize),

    #[error("charged or drained must be valid non-negative numbers")]
    ChargedOrDrained,

    #[error("no normalizer for event type {0}")]
    Unsupported(EventType),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Malformed(err.to_string())
    }
}

/// Normalize one external payload into a canonical event
///
/// Dispatches on the metric type. Reserved types (meal, supplement,
/// biomarker) have no ingestion path yet and are rejected.
pub fn normalize(metric_type: EventType, raw: &Value) -> Result<Event, ValidationError> {
    match metric_type {
        EventType::Sleep
        | EventType::Activity
        | EventType::Hrv
        | EventType::Stress
        | EventType::DailyStats
        | EventType::BodyBattery => {
            let payload: SyncPayload = serde_json::from_value(raw.clone())?;
            garmin::normalize_sync(metric_type, &payload)
        }
        EventType::SubjectiveFeeling => {
            let payload: CheckinPayload = serde_json::from_value(raw.clone())?;
            if payload.user_id.is_empty() {
                return Err(ValidationError::Required("user_id"));
            }
            let user_id = payload.user_id.clone();
            checkin::normalize_checkin(&user_id, &payload)
        }
        other => Err(ValidationError::Unsupported(other)),
    }
}

/// Borrowed view over an untyped JSON object with coercing accessors
///
/// Kept at the normalizer boundary so the canonical event `data` is always
/// the strongly typed shape in [`crate::model::payload`].
#[derive(Debug, Clone, Copy)]
pub struct RawPayload<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> RawPayload<'a> {
    pub fn new(fields: &'a Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Numeric field, integer or float representation accepted
    pub fn num(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    /// Numeric field with the missing-key default of 0.0
    pub fn num_or_zero(&self, key: &str) -> f64 {
        self.num(key).unwrap_or(0.0)
    }

    pub fn str(&self, key: &str) -> Option<&'a str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn object(&self, key: &str) -> Option<RawPayload<'a>> {
        self.fields.get(key).and_then(Value::as_object).map(Self::new)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }
}

/// Seconds to whole minutes, discarding fractional minutes
pub(crate) fn secs_to_minutes(seconds: f64) -> i64 {
    (seconds / 60.0) as i64
}
