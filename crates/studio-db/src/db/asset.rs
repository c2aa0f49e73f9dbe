use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use studio_core::models::{Asset, AssetUpdate, ListAssetsQuery, NewAsset};
use studio_core::AppError;
use uuid::Uuid;

use super::{from_json_text, from_millis, now_millis, to_json_text};

const ASSET_COLUMNS: &str = "id, public_id, cloudinary_url, secure_url, width, height, bytes, \
     format, folder, tags, metadata, original_filename, user_id, uploaded_at, updated_at";

#[derive(sqlx::FromRow)]
struct AssetRow {
    id: String,
    public_id: String,
    cloudinary_url: String,
    secure_url: String,
    width: Option<i64>,
    height: Option<i64>,
    bytes: Option<i64>,
    format: String,
    folder: Option<String>,
    tags: String,
    metadata: Option<String>,
    original_filename: Option<String>,
    user_id: Option<String>,
    uploaded_at: i64,
    updated_at: i64,
}

impl TryFrom<AssetRow> for Asset {
    type Error = AppError;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        Ok(Asset {
            id: row.id,
            public_id: row.public_id,
            cloudinary_url: row.cloudinary_url,
            secure_url: row.secure_url,
            width: row.width.and_then(|w| u32::try_from(w).ok()),
            height: row.height.and_then(|h| u32::try_from(h).ok()),
            bytes: row.bytes.and_then(|b| u64::try_from(b).ok()),
            format: row.format,
            folder: row.folder,
            tags: from_json_text("tags", &row.tags)?,
            metadata: row
                .metadata
                .as_deref()
                .map(|m| from_json_text("metadata", m))
                .transpose()?,
            original_filename: row.original_filename,
            user_id: row.user_id,
            uploaded_at: from_millis(row.uploaded_at)?,
            updated_at: from_millis(row.updated_at)?,
        })
    }
}

/// Repository for stored image records
#[derive(Clone)]
pub struct AssetRepository {
    pool: SqlitePool,
}

impl AssetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a record, or refresh the host fields of the record with the same public ID.
    /// Re-uploads keep the original `id`, `uploaded_at` and metadata.
    #[tracing::instrument(skip(self, asset), fields(db.table = "assets", db.operation = "upsert", public_id = %asset.public_id))]
    pub async fn upsert(&self, asset: NewAsset) -> Result<Asset, AppError> {
        let now = now_millis();

        let row = sqlx::query_as::<Sqlite, AssetRow>(&format!(
            r#"
            INSERT INTO assets (
                id, public_id, cloudinary_url, secure_url, width, height, bytes,
                format, folder, tags, metadata, original_filename, user_id,
                uploaded_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (public_id) DO UPDATE SET
                cloudinary_url = excluded.cloudinary_url,
                secure_url = excluded.secure_url,
                width = excluded.width,
                height = excluded.height,
                bytes = excluded.bytes,
                format = excluded.format,
                folder = excluded.folder,
                tags = excluded.tags,
                original_filename = COALESCE(excluded.original_filename, assets.original_filename),
                user_id = COALESCE(excluded.user_id, assets.user_id),
                updated_at = excluded.updated_at
            RETURNING {}
            "#,
            ASSET_COLUMNS
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&asset.public_id)
        .bind(&asset.cloudinary_url)
        .bind(&asset.secure_url)
        .bind(asset.width.map(i64::from))
        .bind(asset.height.map(i64::from))
        .bind(asset.bytes.map(|b| b as i64))
        .bind(&asset.format)
        .bind(&asset.folder)
        .bind(to_json_text(&asset.tags)?)
        .bind(asset.metadata.as_ref().map(to_json_text).transpose()?)
        .bind(&asset.original_filename)
        .bind(&asset.user_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select"))]
    pub async fn get_by_public_id(&self, public_id: &str) -> Result<Option<Asset>, AppError> {
        let row = sqlx::query_as::<Sqlite, AssetRow>(&format!(
            "SELECT {} FROM assets WHERE public_id = ?",
            ASSET_COLUMNS
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Asset::try_from).transpose()
    }

    /// Filter, sort and limit. An asset matches the tag filter only when it carries
    /// every requested tag. Ties on the sort column fall back to insertion order.
    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select"))]
    pub async fn list(
        &self,
        query: &ListAssetsQuery,
        default_limit: u32,
    ) -> Result<Vec<Asset>, AppError> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM assets WHERE 1 = 1", ASSET_COLUMNS));

        if let Some(folder) = &query.folder {
            builder.push(" AND folder = ").push_bind(folder.clone());
        }
        if let Some(user_id) = &query.user_id {
            builder.push(" AND user_id = ").push_bind(user_id.clone());
        }
        for tag in &query.tags {
            builder
                .push(" AND EXISTS (SELECT 1 FROM json_each(assets.tags) WHERE json_each.value = ")
                .push_bind(tag.clone())
                .push(")");
        }

        let direction = query.order.as_sql();
        builder.push(format!(
            " ORDER BY {} {}, rowid {}",
            query.order_by.column(),
            direction,
            direction
        ));
        builder
            .push(" LIMIT ")
            .push_bind(i64::from(query.limit.unwrap_or(default_limit)));

        let rows = builder
            .build_query_as::<AssetRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Asset::try_from).collect()
    }

    /// Apply a partial update. `updated_at` always moves forward.
    #[tracing::instrument(skip(self, update), fields(db.table = "assets", db.operation = "update"))]
    pub async fn update(&self, public_id: &str, update: AssetUpdate) -> Result<Asset, AppError> {
        let existing = self
            .get_by_public_id(public_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {}", public_id)))?;

        let updated_at = now_millis().max(existing.updated_at.timestamp_millis() + 1);
        let tags = update.tags.unwrap_or(existing.tags);
        let metadata = update.metadata.or(existing.metadata);

        let row = sqlx::query_as::<Sqlite, AssetRow>(&format!(
            r#"
            UPDATE assets
            SET tags = ?, metadata = ?, updated_at = ?
            WHERE public_id = ?
            RETURNING {}
            "#,
            ASSET_COLUMNS
        ))
        .bind(to_json_text(&tags)?)
        .bind(metadata.as_ref().map(to_json_text).transpose()?)
        .bind(updated_at)
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset {}", public_id)))?;

        row.try_into()
    }

    /// Returns whether a record was removed.
    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "delete"))]
    pub async fn delete(&self, public_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM assets WHERE public_id = ?")
            .bind(public_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
