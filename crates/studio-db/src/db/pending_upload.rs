use sqlx::{Sqlite, SqlitePool};
use studio_core::models::{
    CreatePendingUpload, PendingUpload, PendingUploadResult, UploadStatus, UploadStatusUpdate,
};
use studio_core::AppError;
use uuid::Uuid;

use super::{from_json_text, from_millis, now_millis, to_json_text};

const PENDING_UPLOAD_COLUMNS: &str =
    "id, filename, folder, status, user_id, result, error, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct PendingUploadRow {
    id: String,
    filename: Option<String>,
    folder: Option<String>,
    status: String,
    user_id: Option<String>,
    result: Option<String>,
    error: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<PendingUploadRow> for PendingUpload {
    type Error = AppError;

    fn try_from(row: PendingUploadRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<UploadStatus>()
            .map_err(AppError::Internal)?;

        Ok(PendingUpload {
            id: row.id,
            filename: row.filename,
            folder: row.folder,
            status,
            user_id: row.user_id,
            result: row
                .result
                .as_deref()
                .map(|r| from_json_text::<PendingUploadResult>("result", r))
                .transpose()?,
            error: row.error,
            created_at: from_millis(row.created_at)?,
            updated_at: from_millis(row.updated_at)?,
        })
    }
}

/// Repository for direct upload tracking records
#[derive(Clone)]
pub struct PendingUploadRepository {
    pool: SqlitePool,
}

impl PendingUploadRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a record in the `pending` state
    #[tracing::instrument(skip(self), fields(db.table = "pending_uploads", db.operation = "insert"))]
    pub async fn create(&self, input: CreatePendingUpload) -> Result<PendingUpload, AppError> {
        let now = now_millis();

        let row = sqlx::query_as::<Sqlite, PendingUploadRow>(&format!(
            r#"
            INSERT INTO pending_uploads (id, filename, folder, status, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            PENDING_UPLOAD_COLUMNS
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&input.filename)
        .bind(&input.folder)
        .bind(UploadStatus::Pending.as_str())
        .bind(&input.user_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    #[tracing::instrument(skip(self), fields(db.table = "pending_uploads", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: &str) -> Result<Option<PendingUpload>, AppError> {
        let row = sqlx::query_as::<Sqlite, PendingUploadRow>(&format!(
            "SELECT {} FROM pending_uploads WHERE id = ?",
            PENDING_UPLOAD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PendingUpload::try_from).transpose()
    }

    /// Move a record forward. Completion must carry a result and failure a non-empty
    /// error. The write is guarded on the status that was read, so a concurrent change
    /// surfaces as an invalid transition instead of being overwritten.
    #[tracing::instrument(skip(self, update), fields(db.table = "pending_uploads", db.operation = "update", db.record_id = %id, status = %update.status))]
    pub async fn update_status(
        &self,
        id: &str,
        update: UploadStatusUpdate,
    ) -> Result<PendingUpload, AppError> {
        let current = self
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pending upload {}", id)))?;

        if !current.status.can_transition_to(update.status) {
            return Err(AppError::InvalidStatusTransition {
                from: current.status,
                to: update.status,
            });
        }

        let (result, error) = match update.status {
            UploadStatus::Completed => {
                let result = update.result.ok_or_else(|| {
                    AppError::InvalidInput("Completed uploads must include a result".to_string())
                })?;
                (Some(to_json_text(&result)?), None)
            }
            UploadStatus::Failed => {
                let error = update
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .ok_or_else(|| {
                        AppError::InvalidInput(
                            "Failed uploads must include an error message".to_string(),
                        )
                    })?;
                (None, Some(error))
            }
            _ => (None, None),
        };

        let updated_at = now_millis().max(current.updated_at.timestamp_millis());

        let row = sqlx::query_as::<Sqlite, PendingUploadRow>(&format!(
            r#"
            UPDATE pending_uploads
            SET status = ?, result = COALESCE(?, result), error = COALESCE(?, error), updated_at = ?
            WHERE id = ? AND status = ?
            RETURNING {}
            "#,
            PENDING_UPLOAD_COLUMNS
        ))
        .bind(update.status.as_str())
        .bind(result)
        .bind(error)
        .bind(updated_at)
        .bind(id)
        .bind(current.status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => {
                let latest = self
                    .get(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Pending upload {}", id)))?;
                Err(AppError::InvalidStatusTransition {
                    from: latest.status,
                    to: update.status,
                })
            }
        }
    }

    /// Newest first
    #[tracing::instrument(skip(self), fields(db.table = "pending_uploads", db.operation = "select"))]
    pub async fn list_by_status(
        &self,
        status: UploadStatus,
        user_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<PendingUpload>, AppError> {
        let rows = sqlx::query_as::<Sqlite, PendingUploadRow>(&format!(
            r#"
            SELECT {}
            FROM pending_uploads
            WHERE status = ? AND (? IS NULL OR user_id = ?)
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
            PENDING_UPLOAD_COLUMNS
        ))
        .bind(status.as_str())
        .bind(user_id)
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PendingUpload::try_from).collect()
    }

    #[tracing::instrument(skip(self), fields(db.table = "pending_uploads", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM pending_uploads WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
