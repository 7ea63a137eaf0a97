//! Normalizer for manual daily check-ins
//!
//! A check-in is four 1-10 ratings plus an optional note. The event time is
//! pinned to the start of the current local day, so a user gets exactly one
//! feeling event per calendar day and later same-day submissions overwrite
//! the earlier one through the store's identity rule.

use crate::model::payload::SubjectiveFeeling;
use crate::model::{Event, EventType, Source};
use crate::normalize::ValidationError;
use crate::store::types::local_day_start;
use chrono::Local;
use serde::Deserialize;

const RATING_MIN: i64 = 1;
const RATING_MAX: i64 = 10;
const NOTES_MAX_CHARS: usize = 1000;

/// Request body of a check-in submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckinPayload {
    /// Authenticated user, injected by the HTTP layer
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub energy: i64,
    #[serde(default)]
    pub mood: i64,
    #[serde(default)]
    pub focus: i64,
    #[serde(default)]
    pub physical: i64,
    #[serde(default)]
    pub notes: String,
}

fn validate_scale(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if !(RATING_MIN..=RATING_MAX).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            min: RATING_MIN,
            max: RATING_MAX,
            got: value,
        });
    }
    Ok(())
}

/// Normalize a check-in into a subjective-feeling event for today
pub fn normalize_checkin(
    user_id: &str,
    payload: &CheckinPayload,
) -> Result<Event, ValidationError> {
    validate_scale("energy", payload.energy)?;
    validate_scale("mood", payload.mood)?;
    validate_scale("focus", payload.focus)?;
    validate_scale("physical", payload.physical)?;

    if payload.notes.chars().count() > NOTES_MAX_CHARS {
        return Err(ValidationError::NotesTooLong(NOTES_MAX_CHARS));
    }

    let data = SubjectiveFeeling {
        energy: payload.energy,
        mood: payload.mood,
        focus: payload.focus,
        physical: payload.physical,
        notes: payload.notes.clone(),
    };

    Ok(Event::new(
        local_day_start(Local::now().date_naive()),
        user_id,
        EventType::SubjectiveFeeling,
        Source::ManualEntry,
        serde_json::to_value(&data)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::local_date_of;

    fn payload(energy: i64) -> CheckinPayload {
        CheckinPayload {
            user_id: "u1".to_string(),
            energy,
            mood: 8,
            focus: 6,
            physical: 7,
            notes: String::new(),
        }
    }

    #[test]
    fn test_rating_boundaries() {
        assert!(normalize_checkin("u1", &payload(0)).is_err());
        assert!(normalize_checkin("u1", &payload(11)).is_err());
        assert!(normalize_checkin("u1", &payload(1)).is_ok());
        assert!(normalize_checkin("u1", &payload(10)).is_ok());
    }

    #[test]
    fn test_out_of_range_names_the_field() {
        let err = normalize_checkin("u1", &payload(0)).unwrap_err();
        assert_eq!(err.to_string(), "energy must be between 1 and 10, got 0");
    }

    #[test]
    fn test_notes_length_boundary() {
        let mut p = payload(5);
        p.notes = "x".repeat(1000);
        assert!(normalize_checkin("u1", &p).is_ok());

        p.notes = "x".repeat(1001);
        assert_eq!(
            normalize_checkin("u1", &p).unwrap_err(),
            ValidationError::NotesTooLong(1000)
        );
    }

    #[test]
    fn test_event_is_pinned_to_start_of_today() {
        let event = normalize_checkin("u1", &payload(7)).unwrap();
        assert_eq!(event.event_type, EventType::SubjectiveFeeling);
        assert_eq!(event.source, Source::ManualEntry);
        assert_eq!(local_date_of(event.time), Local::now().date_naive());
        assert_eq!(event.time, local_day_start(Local::now().date_naive()));
        assert_eq!(event.data["energy"], 7);
    }
}
