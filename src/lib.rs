//! # Vitalog
//!
//! Biometric event store and insight engine. Ingests per-day device
//! measurements (sleep, activity, HRV, stress, body battery, daily totals)
//! and subjective self-reports, stores them as a unified time-series, and
//! derives descriptive correlations between objective metrics and
//! subjective well-being.
//!
//! ## Modules
//!
//! - [`model`]: Canonical event model and typed payloads
//! - [`normalize`]: Converters from external payload shapes into events
//! - [`store`]: SQLite-backed store with upsert-by-identity semantics
//! - [`insight`]: Day-level aggregation and two-cohort comparisons
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vitalog::model::EventType;
//! use vitalog::normalize;
//! use vitalog::store::{EventStore, TimeRange};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = EventStore::in_memory()?;
//!
//!     // Normalize an external payload into a canonical event
//!     let event = normalize::normalize(
//!         EventType::Sleep,
//!         &json!({
//!             "user_id": "u1",
//!             "date": "2026-01-28",
//!             "sleep_data": {"sleep_time_seconds": 28800}
//!         }),
//!     )?;
//!
//!     // Idempotent write: re-syncing the same day refreshes in place
//!     let outcome = store.upsert(&event).await?;
//!     assert!(outcome.inserted);
//!
//!     // Read back the last week
//!     let events = store.query_by_user("u1", TimeRange::last_days(7)).await?;
//!     println!("{} events", events.len());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod insight;
pub mod model;
pub mod normalize;
pub mod store;

// Re-export top-level types for convenience
pub use model::{Event, EventType, Source};

pub use store::{
    EventStore, StorageError, StoreConfig, StoreResult, TimeRange, UpsertOutcome,
};

pub use normalize::{normalize, CheckinPayload, ValidationError};

pub use insight::{CorrelationInsight, DailyAggregate, InsightEngine, InsightReport};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};
