//! Database repositories for the data access layer
//!
//! One repository per table. Timestamps are stored as unix epoch milliseconds and
//! list/JSON columns as JSON text.

pub mod asset;
pub mod pending_upload;

pub use asset::AssetRepository;
pub use pending_upload::PendingUploadRepository;

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use studio_core::AppError;

/// Connection pool plus repository constructors
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database at `url`, e.g. `sqlite://studio.db?mode=rwc`.
    #[tracing::instrument(skip(url))]
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::debug!("Database pool ready");
        Ok(Self { pool })
    }

    /// Private in-memory database. A single connection that is never recycled keeps the
    /// data alive for the lifetime of the pool.
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Apply pending migrations. Safe to call on every start.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(sqlx::Error::from)?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn assets(&self) -> AssetRepository {
        AssetRepository::new(self.pool.clone())
    }

    pub fn pending_uploads(&self) -> PendingUploadRepository {
        PendingUploadRepository::new(self.pool.clone())
    }
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub(crate) fn from_millis(ms: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| AppError::Internal(format!("Stored timestamp out of range: {}", ms)))
}

pub(crate) fn to_json_text<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value)
        .map_err(|e| AppError::Internal(format!("Failed to encode JSON column: {}", e)))
}

pub(crate) fn from_json_text<T: serde::de::DeserializeOwned>(
    column: &str,
    text: &str,
) -> Result<T, AppError> {
    serde_json::from_str(text)
        .map_err(|e| AppError::Internal(format!("Corrupt JSON in column {}: {}", column, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrate_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db.migrate().await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('assets', 'pending_uploads') ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();
        assert_eq!(tables, vec!["assets".to_string(), "pending_uploads".to_string()]);
    }

    #[tokio::test]
    async fn connect_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studio.db");
        let url = format!("sqlite://{}", path.display());

        let db = Database::connect(&url).await.unwrap();
        db.migrate().await.unwrap();
        assert!(path.exists());

        db.pool().close().await;
    }

    #[test]
    fn millis_round_trip() {
        let now = now_millis();
        assert_eq!(from_millis(now).unwrap().timestamp_millis(), now);
    }
}
