//! Storage error types

use crate::model::EventType;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur in the event store
#[derive(Error, Debug)]
pub enum StorageError {
    /// Underlying SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem failure while opening the store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A stored row that no longer parses (bad discriminator, mangled JSON)
    #[error("Corrupt row: {0}")]
    Corruption(String),

    /// Targeted delete/lookup found nothing
    #[error("Event not found: {event_type} at {time} for user {user_id}")]
    NotFound {
        user_id: String,
        event_type: EventType,
        time: DateTime<Utc>,
    },

    /// Operation exceeded the configured deadline
    #[error("Storage operation timed out: {0}")]
    Timeout(&'static str),

    /// Connection lock was poisoned
    #[error("Lock error: {0}")]
    Lock(String),

    /// Blocking task failed to complete
    #[error("Task error: {0}")]
    Task(String),
}

impl StorageError {
    /// Whether a caller's retry policy may reasonably retry this error
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::Timeout(_) => true,
            StorageError::Database(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::Timeout("upsert");
        assert_eq!(err.to_string(), "Storage operation timed out: upsert");
        assert!(err.is_transient());
    }

    #[test]
    fn test_not_found_is_not_transient() {
        let err = StorageError::NotFound {
            user_id: "u1".to_string(),
            event_type: EventType::Sleep,
            time: Utc::now(),
        };
        assert!(!err.is_transient());
        assert!(err.to_string().contains("sleep"));
    }
}
