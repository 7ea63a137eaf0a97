//! Canonical event model
//!
//! This module defines the unified record shape shared by every component:
//! - `Event`: a single timestamped, typed, user-scoped measurement or self-report
//! - `EventType` and `Source`: closed enumerations for the discriminator fields
//! - per-type payload structs (see [`payload`])
//!
//! The identity of an event is the triple `(time, user_id, event_type)`;
//! re-submitting the same triple is an update, not a duplicate.

pub mod payload;

pub use payload::{
    ActivityData, BodyBatteryData, DailyStatsData, HrvData, SleepData, StressData,
    SubjectiveFeeling,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A single canonical event
///
/// `data` is a type-specific JSON object, opaque to the store. The shape of
/// that object for each `event_type` is defined by the structs in [`payload`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// The moment this measurement pertains to (not ingestion time)
    pub time: DateTime<Utc>,
    /// Owning user identifier
    pub user_id: String,
    /// Discriminator for the payload shape
    pub event_type: EventType,
    /// Provenance of the measurement
    pub source: Source,
    /// Type-specific payload
    pub data: serde_json::Value,
    /// Optional auxiliary payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Optional score in [0,1] for non-authoritative sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Event {
    /// Create a new event with the required fields
    pub fn new(
        time: DateTime<Utc>,
        user_id: impl Into<String>,
        event_type: EventType,
        source: Source,
        data: serde_json::Value,
    ) -> Self {
        Self {
            time,
            user_id: user_id.into(),
            event_type,
            source,
            data,
            metadata: None,
            confidence: None,
        }
    }

    /// Builder: attach auxiliary metadata
    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Builder: set a confidence score
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Decode the payload into a typed struct
    pub fn decode_data<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }
}

/// The closed set of event types
///
/// `Meal`, `Supplement` and `Biomarker` are reserved: they are valid stored
/// types but no normalizer produces them yet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Sleep,
    Activity,
    Hrv,
    Stress,
    DailyStats,
    BodyBattery,
    SubjectiveFeeling,
    Meal,
    Supplement,
    Biomarker,
}

impl EventType {
    /// Get all event types for iteration
    pub fn all() -> &'static [EventType] {
        &[
            EventType::Sleep,
            EventType::Activity,
            EventType::Hrv,
            EventType::Stress,
            EventType::DailyStats,
            EventType::BodyBattery,
            EventType::SubjectiveFeeling,
            EventType::Meal,
            EventType::Supplement,
            EventType::Biomarker,
        ]
    }

    /// Stable string form, used as the storage discriminator
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Sleep => "sleep",
            EventType::Activity => "activity",
            EventType::Hrv => "hrv",
            EventType::Stress => "stress",
            EventType::DailyStats => "daily_stats",
            EventType::BodyBattery => "body_battery",
            EventType::SubjectiveFeeling => "subjective_feeling",
            EventType::Meal => "meal",
            EventType::Supplement => "supplement",
            EventType::Biomarker => "biomarker",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::all()
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownVariant {
                field: "event_type",
                value: s.to_string(),
            })
    }
}

/// Provenance of an event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Synced from a wearable device
    DeviceSync,
    /// Entered by hand (check-in forms)
    ManualEntry,
    /// Extracted from an uploaded document
    Parsed,
    /// Inferred by a model, carries a confidence score
    ModelInferred,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::DeviceSync => "device_sync",
            Source::ManualEntry => "manual_entry",
            Source::Parsed => "parsed",
            Source::ModelInferred => "model_inferred",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Source {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Source::DeviceSync,
            Source::ManualEntry,
            Source::Parsed,
            Source::ModelInferred,
        ]
        .iter()
        .find(|v| v.as_str() == s)
        .copied()
        .ok_or_else(|| UnknownVariant {
            field: "source",
            value: s.to_string(),
        })
    }
}

/// A string that does not name a known enum variant
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown {field}: {value}")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}
