use async_trait::async_trait;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;

use super::models::{format_timestamp, NewReading, ReadingRow, StoredReading};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored timestamp is not valid RFC 3339: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

/// Append-only reading storage shared by ingestion and queries.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Append `reading` and return it with its assigned id. The row is
    /// durable once this returns.
    async fn insert(&self, reading: &NewReading) -> Result<StoredReading, StoreError>;

    /// At most `limit` readings, newest `timestamp` first (ties: newest id
    /// first).
    async fn recent(&self, limit: u32) -> Result<Vec<StoredReading>, StoreError>;
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

/// `ReadingStore` backed by the `readings` table. Each call checks a
/// connection out of the pool and returns it when the query finishes.
#[derive(Debug, Clone)]
pub struct SqliteReadingStore {
    pool: SqlitePool,
}

impl SqliteReadingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingStore for SqliteReadingStore {
    async fn insert(&self, reading: &NewReading) -> Result<StoredReading, StoreError> {
        let row = sqlx::query_as::<_, ReadingRow>(
            r#"
            INSERT INTO readings
                (panel_id, voltage, current, load, temperature, status, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, panel_id, voltage, current, load, temperature, status, timestamp
            "#,
        )
        .bind(&reading.panel_id)
        .bind(reading.voltage)
        .bind(reading.current)
        .bind(reading.load)
        .bind(reading.temperature)
        .bind(&reading.status)
        .bind(format_timestamp(&reading.timestamp))
        .fetch_one(&self.pool)
        .await?;

        debug!(id = row.id, panel_id = %row.panel_id, "Reading row inserted");
        Ok(row.try_into()?)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<StoredReading>, StoreError> {
        let rows = sqlx::query_as::<_, ReadingRow>(
            r#"
            SELECT id, panel_id, voltage, current, load, temperature, status, timestamp
            FROM readings
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| StoredReading::try_from(row).map_err(StoreError::from))
            .collect()
    }
}
