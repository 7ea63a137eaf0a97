//! Event store
//!
//! Durable, idempotent persistence for canonical events, backed by SQLite.
//! The identity triple `(time, user_id, event_type)` is the primary key;
//! writing an existing identity overwrites its payload fields in place.

pub mod error;
pub mod events;
pub mod types;

pub use error::{StorageError, StoreResult};
pub use events::{EventStore, StoreConfig, UpsertOutcome};
pub use types::{EndBound, TimeRange};
