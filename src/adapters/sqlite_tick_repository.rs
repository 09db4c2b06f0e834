//! SQLite `TickRepository` backend (spec.md §6 `repository.sqlite`).
//! Grounded on the teacher's `rusqlite` persistence layer (`signals/db_storage.rs`):
//! a single table, a blocking connection guarded by a mutex, driven off the
//! async call sites via `tokio::task::spawn_blocking`.
//!
//! Open Question (spec.md §9, "stored-tick schema evolution"): ticks are
//! stored as an opaque JSON blob rather than one column per field, so adding
//! a field to `Tick` never requires a migration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::sync::Arc;

use crate::domain::Tick;
use crate::errors::{EngineError, EngineResult};
use crate::ports::TickRepository;

pub struct SqliteTickRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTickRepository {
    pub fn open(path: &str) -> EngineResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| EngineError::Persistence(format!("failed to open {path}: {e}")))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS ticks (
                created_time_ms INTEGER NOT NULL,
                payload TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| EngineError::Persistence(e.to_string()))?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_ticks_created_time ON ticks(created_time_ms)",
            [],
        )
        .map_err(|e| EngineError::Persistence(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl TickRepository for SqliteTickRepository {
    async fn create(&self, tick: &Tick) -> EngineResult<()> {
        let conn = self.conn.clone();
        let tick = tick.clone();
        tokio::task::spawn_blocking(move || {
            let payload = serde_json::to_string(&tick)
                .map_err(|e| EngineError::Persistence(e.to_string()))?;
            conn.lock()
                .execute(
                    "INSERT INTO ticks (created_time_ms, payload) VALUES (?1, ?2)",
                    params![tick.created_time.timestamp_millis(), payload],
                )
                .map_err(|e| EngineError::Persistence(e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| EngineError::Persistence(e.to_string()))?
    }

    async fn history_since(&self, since: DateTime<Utc>) -> EngineResult<Vec<Tick>> {
        let conn = self.conn.clone();
        let since_ms = since.timestamp_millis();
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            let mut stmt = guard
                .prepare(
                    "SELECT payload FROM ticks WHERE created_time_ms >= ?1 ORDER BY created_time_ms ASC",
                )
                .map_err(|e| EngineError::Persistence(e.to_string()))?;
            let rows = stmt
                .query_map(params![since_ms], |row| row.get::<_, String>(0))
                .map_err(|e| EngineError::Persistence(e.to_string()))?;

            let mut ticks = Vec::new();
            for row in rows {
                let payload = row.map_err(|e| EngineError::Persistence(e.to_string()))?;
                let tick: Tick = serde_json::from_str(&payload)
                    .map_err(|e| EngineError::Persistence(e.to_string()))?;
                ticks.push(tick);
            }
            Ok(ticks)
        })
        .await
        .map_err(|e| EngineError::Persistence(e.to_string()))?
    }
}
