//! SQLite-backed event store
//!
//! One connection behind a mutex; blocking SQLite work runs on the Tokio
//! blocking pool with a per-operation deadline. The upsert is a single
//! `INSERT .. ON CONFLICT DO UPDATE` keyed on the identity triple, so
//! concurrent writes to the same identity cannot interleave into a corrupted
//! merge.

use crate::model::{Event, EventType, Source};
use crate::store::error::{StorageError, StoreResult};
use crate::store::types::TimeRange;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags, Row};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Event store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    pub db_path: PathBuf,
    /// Deadline for a single store operation in milliseconds
    pub op_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let db_path = dirs::data_local_dir()
            .map(|p| p.join("vitalog").join("events.db"))
            .unwrap_or_else(|| PathBuf::from("./vitalog_data/events.db"));
        Self {
            db_path,
            op_timeout_ms: 10_000,
        }
    }
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Default::default()
        }
    }
}

/// Result of an upsert: created a new row, or refreshed an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub inserted: bool,
}

/// Durable event store with upsert-by-identity semantics
pub struct EventStore {
    conn: Arc<Mutex<Connection>>,
    op_timeout: Duration,
}

impl EventStore {
    /// Open or create the store at the configured path
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            &config.db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            op_timeout: Duration::from_millis(config.op_timeout_ms),
        })
    }

    /// In-memory store, for tests
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            op_timeout: Duration::from_secs(5),
        })
    }

    fn init_schema(conn: &Connection) -> StoreResult<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS events (
                time INTEGER NOT NULL,
                user_id TEXT NOT NULL,
                event_type TEXT NOT NULL,
                source TEXT NOT NULL,
                data TEXT NOT NULL,
                metadata TEXT,
                confidence REAL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (time, user_id, event_type)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_events_user_time ON events(user_id, time)",
            [],
        )?;

        Ok(())
    }

    /// Run a closure against the connection on the blocking pool, bounded by
    /// the operation deadline
    async fn with_conn<T, F>(&self, op: &'static str, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let task = tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|e| StorageError::Lock(e.to_string()))?;
            f(&mut guard)
        });

        match tokio::time::timeout(self.op_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(StorageError::Task(join_err.to_string())),
            Err(_) => Err(StorageError::Timeout(op)),
        }
    }

    /// Insert a new event, or overwrite the payload fields of an existing one
    /// sharing the same `(time, user_id, event_type)` identity
    ///
    /// Returns whether a new row was created, so callers can report
    /// "created vs refreshed" without a separate read.
    pub async fn upsert(&self, event: &Event) -> StoreResult<UpsertOutcome> {
        let event = event.clone();
        self.with_conn("upsert", move |conn| {
            let data = serde_json::to_string(&event.data)?;
            let metadata = event
                .metadata
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?;

            let tx = conn.transaction()?;

            let existed: bool = tx.query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM events
                    WHERE time = ?1 AND user_id = ?2 AND event_type = ?3
                )",
                params![
                    event.time.timestamp_millis(),
                    event.user_id,
                    event.event_type.as_str()
                ],
                |row| row.get(0),
            )?;

            tx.execute(
                "INSERT INTO events
                    (time, user_id, event_type, source, data, metadata, confidence, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT (time, user_id, event_type) DO UPDATE SET
                    source = excluded.source,
                    data = excluded.data,
                    metadata = excluded.metadata,
                    confidence = excluded.confidence,
                    updated_at = excluded.updated_at",
                params![
                    event.time.timestamp_millis(),
                    event.user_id,
                    event.event_type.as_str(),
                    event.source.as_str(),
                    data,
                    metadata,
                    event.confidence,
                    Utc::now().timestamp_millis(),
                ],
            )?;

            tx.commit()?;

            Ok(UpsertOutcome { inserted: !existed })
        })
        .await
    }

    /// Events of one type for a user within the window, newest first
    pub async fn query_by_user_and_type(
        &self,
        user_id: &str,
        event_type: EventType,
        range: TimeRange,
    ) -> StoreResult<Vec<Event>> {
        let user_id = user_id.to_string();
        let sql = format!(
            "SELECT time, user_id, event_type, source, data, metadata, confidence
             FROM events
             WHERE user_id = ?1 AND event_type = ?2 AND time >= ?3 AND time {} ?4
             ORDER BY time DESC",
            range.end_op()
        );

        self.with_conn("query_by_user_and_type", move |conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map(
                params![
                    user_id,
                    event_type.as_str(),
                    range.start.timestamp_millis(),
                    range.end.timestamp_millis()
                ],
                row_to_event,
            )?;
            collect_events(rows)
        })
        .await
    }

    /// All events for a user within the window, newest first
    pub async fn query_by_user(&self, user_id: &str, range: TimeRange) -> StoreResult<Vec<Event>> {
        let user_id = user_id.to_string();
        let sql = format!(
            "SELECT time, user_id, event_type, source, data, metadata, confidence
             FROM events
             WHERE user_id = ?1 AND time >= ?2 AND time {} ?3
             ORDER BY time DESC",
            range.end_op()
        );

        self.with_conn("query_by_user", move |conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map(
                params![
                    user_id,
                    range.start.timestamp_millis(),
                    range.end.timestamp_millis()
                ],
                row_to_event,
            )?;
            collect_events(rows)
        })
        .await
    }

    /// Per-type event counts for a user within the window
    pub async fn count_by_type(
        &self,
        user_id: &str,
        range: TimeRange,
    ) -> StoreResult<HashMap<EventType, i64>> {
        let user_id = user_id.to_string();
        let sql = format!(
            "SELECT event_type, COUNT(*)
             FROM events
             WHERE user_id = ?1 AND time >= ?2 AND time {} ?3
             GROUP BY event_type",
            range.end_op()
        );

        self.with_conn("count_by_type", move |conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map(
                params![
                    user_id,
                    range.start.timestamp_millis(),
                    range.end.timestamp_millis()
                ],
                |row| {
                    let type_str: String = row.get(0)?;
                    let count: i64 = row.get(1)?;
                    Ok((type_str, count))
                },
            )?;

            let mut counts = HashMap::new();
            for row in rows {
                let (type_str, count) = row?;
                let event_type = EventType::from_str(&type_str)
                    .map_err(|e| StorageError::Corruption(e.to_string()))?;
                counts.insert(event_type, count);
            }
            Ok(counts)
        })
        .await
    }

    /// Delete one event by identity; fails with NotFound when no row matches
    pub async fn delete(
        &self,
        user_id: &str,
        event_type: EventType,
        time: DateTime<Utc>,
    ) -> StoreResult<()> {
        let user_id = user_id.to_string();
        self.with_conn("delete", move |conn| {
            let affected = conn.execute(
                "DELETE FROM events
                 WHERE user_id = ?1 AND event_type = ?2 AND time = ?3",
                params![user_id, event_type.as_str(), time.timestamp_millis()],
            )?;

            if affected == 0 {
                return Err(StorageError::NotFound {
                    user_id,
                    event_type,
                    time,
                });
            }
            Ok(())
        })
        .await
    }

    /// Total number of stored events, for health reporting
    pub async fn total_events(&self) -> StoreResult<i64> {
        self.with_conn("total_events", |conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
    }

    /// Cheap connectivity probe, for readiness checks
    pub async fn ping(&self) -> StoreResult<()> {
        self.with_conn("ping", |conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))?;
            Ok(())
        })
        .await
    }
}

fn row_to_event(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        time_ms: row.get(0)?,
        user_id: row.get(1)?,
        event_type: row.get(2)?,
        source: row.get(3)?,
        data: row.get(4)?,
        metadata: row.get(5)?,
        confidence: row.get(6)?,
    })
}

/// Row as stored, before discriminators and JSON are parsed
struct RawRow {
    time_ms: i64,
    user_id: String,
    event_type: String,
    source: String,
    data: String,
    metadata: Option<String>,
    confidence: Option<f64>,
}

impl RawRow {
    fn into_event(self) -> StoreResult<Event> {
        let time = DateTime::<Utc>::from_timestamp_millis(self.time_ms).ok_or_else(|| {
            StorageError::Corruption(format!("timestamp out of range: {}", self.time_ms))
        })?;
        let event_type = EventType::from_str(&self.event_type)
            .map_err(|e| StorageError::Corruption(e.to_string()))?;
        let source =
            Source::from_str(&self.source).map_err(|e| StorageError::Corruption(e.to_string()))?;
        let data = serde_json::from_str(&self.data)?;
        let metadata = self
            .metadata
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Event {
            time,
            user_id: self.user_id,
            event_type,
            source,
            data,
            metadata,
            confidence: self.confidence,
        })
    }
}

fn collect_events(
    rows: impl Iterator<Item = rusqlite::Result<RawRow>>,
) -> StoreResult<Vec<Event>> {
    let mut events = Vec::new();
    for row in rows {
        events.push(row?.into_event()?);
    }
    Ok(events)
}
