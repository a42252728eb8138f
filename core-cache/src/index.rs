//! SQLite-backed span index.
//!
//! Tracks which byte ranges of which identifiers are materialized on disk.
//! The index is the source of truth for `is_cached` answers; span files
//! without an index row are invisible to the cache.

use crate::error::Result;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::Row;
use std::path::Path;
use tracing::debug;

/// One contiguous cached byte range of a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanRecord {
    pub identifier: String,
    pub offset: u64,
    pub length: u64,
    /// Span file name, relative to the cache directory.
    pub file: String,
    pub created_at: i64,
    pub last_access: i64,
}

/// Index over all cached spans.
pub struct SpanIndex {
    pool: SqlitePool,
}

impl SpanIndex {
    /// Open (or create) the index database at the given path.
    pub async fn open(path: &Path, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn initialize(&self) -> Result<()> {
        debug!("Initializing span index");

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS spans (
                identifier TEXT NOT NULL,
                offset INTEGER NOT NULL,
                length INTEGER NOT NULL,
                file TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                last_access INTEGER NOT NULL,
                PRIMARY KEY (identifier, offset)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_spans_last_access ON spans(last_access)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a span, replacing any previous span at the same offset.
    pub async fn insert(&self, record: &SpanRecord) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO spans
                (identifier, offset, length, file, created_at, last_access)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.identifier)
        .bind(record.offset as i64)
        .bind(record.length as i64)
        .bind(&record.file)
        .bind(record.created_at)
        .bind(record.last_access)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove a single span row.
    pub async fn remove(&self, identifier: &str, offset: u64) -> Result<()> {
        sqlx::query("DELETE FROM spans WHERE identifier = ? AND offset = ?")
            .bind(identifier)
            .bind(offset as i64)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// All spans of one identifier, ordered by offset.
    pub async fn spans_for(&self, identifier: &str) -> Result<Vec<SpanRecord>> {
        let rows = sqlx::query(
            "SELECT identifier, offset, length, file, created_at, last_access
             FROM spans WHERE identifier = ? ORDER BY offset ASC",
        )
        .bind(identifier)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::row_to_span).collect())
    }

    /// All identifiers currently present in the index.
    pub async fn identifiers(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT identifier FROM spans")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get::<String, _>("identifier")).collect())
    }

    /// Update the access timestamp of a span.
    pub async fn touch(&self, identifier: &str, offset: u64, now: i64) -> Result<()> {
        sqlx::query("UPDATE spans SET last_access = ? WHERE identifier = ? AND offset = ?")
            .bind(now)
            .bind(identifier)
            .bind(offset as i64)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Total bytes currently indexed.
    pub async fn total_bytes(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COALESCE(SUM(length), 0) AS total FROM spans")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("total") as u64)
    }

    /// Least-recently-used spans, oldest first. Insertion order breaks ties so
    /// eviction stays deterministic even when timestamps collide.
    pub async fn lru_candidates(&self, limit: u32) -> Result<Vec<SpanRecord>> {
        let rows = sqlx::query(
            "SELECT identifier, offset, length, file, created_at, last_access
             FROM spans ORDER BY last_access ASC, created_at ASC, rowid ASC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::row_to_span).collect())
    }

    fn row_to_span(row: &sqlx::sqlite::SqliteRow) -> SpanRecord {
        SpanRecord {
            identifier: row.get::<String, _>("identifier"),
            offset: row.get::<i64, _>("offset") as u64,
            length: row.get::<i64, _>("length") as u64,
            file: row.get::<String, _>("file"),
            created_at: row.get::<i64, _>("created_at"),
            last_access: row.get::<i64, _>("last_access"),
        }
    }
}
