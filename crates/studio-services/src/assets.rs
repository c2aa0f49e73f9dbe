//! Backend function surface over the image host and the registry
//!
//! Every operation that talks to the image host checks the configuration gate first and
//! fails with `AppError::NotConfigured` when it is closed. Registry-only operations work
//! regardless.

use std::sync::Arc;

use studio_cloudinary::{CloudinaryClient, MediaHost};
use studio_core::constants::{
    DEFAULT_LARGE_UPLOAD_FOLDER, DEFAULT_LIST_LIMIT, DEFAULT_UPLOAD_FOLDER, DEFAULT_UPLOAD_TAGS,
};
use studio_core::models::{
    Asset, AssetUpdate, CloudinaryUploadResponse, CreatePendingUpload, DeleteResult,
    ListAssetsQuery, NewAsset, PendingUpload, Transformation, TransformResult, UploadCredentials,
    UploadOptions, UploadResult, UploadStatus, UploadStatusUpdate,
};
use studio_core::validation::{
    validate_folder, validate_metadata, validate_public_id, validate_tags,
};
use studio_core::{AppError, StudioConfig};
use studio_db::{AssetRepository, Database, PendingUploadRepository};
use validator::Validate;

const NOT_CONFIGURED: &str = "Cloudinary environment variables not set";

#[derive(Clone)]
pub struct AssetService {
    host: Option<Arc<dyn MediaHost>>,
    assets: AssetRepository,
    pending_uploads: PendingUploadRepository,
    default_list_limit: u32,
}

impl AssetService {
    /// `host` is `None` when the configuration gate is closed.
    pub fn new(db: &Database, host: Option<Arc<dyn MediaHost>>, default_list_limit: u32) -> Self {
        Self {
            host,
            assets: db.assets(),
            pending_uploads: db.pending_uploads(),
            default_list_limit,
        }
    }

    pub fn from_config(config: &StudioConfig, db: &Database) -> Result<Self, AppError> {
        let host: Option<Arc<dyn MediaHost>> = if config.is_configured() {
            Some(Arc::new(CloudinaryClient::from_config(config)?))
        } else {
            tracing::warn!("Image host credentials missing; host operations are disabled");
            None
        };

        Ok(Self::new(db, host, config.default_list_limit))
    }

    /// The configuration gate
    pub fn check_config(&self) -> bool {
        self.host.is_some()
    }

    pub fn ensure_configured(&self) -> Result<(), AppError> {
        self.host().map(|_| ())
    }

    pub fn host(&self) -> Result<Arc<dyn MediaHost>, AppError> {
        self.host
            .clone()
            .ok_or_else(|| AppError::NotConfigured(NOT_CONFIGURED.to_string()))
    }

    /// Inline upload of a data URI (or raw base64 payload). Host failures come back as
    /// `UploadResult { success: false, .. }`; gate and validation failures as errors.
    pub async fn upload(
        &self,
        base64_data: &str,
        options: UploadOptions,
    ) -> Result<UploadResult, AppError> {
        let (result, _) = self.upload_and_record(base64_data, options).await?;
        Ok(result)
    }

    /// Inline upload that also returns the registry record written for it.
    #[tracing::instrument(skip(self, base64_data, options), fields(folder = ?options.folder, filename = ?options.filename))]
    pub async fn upload_and_record(
        &self,
        base64_data: &str,
        mut options: UploadOptions,
    ) -> Result<(UploadResult, Option<Asset>), AppError> {
        let host = self.host()?;

        if base64_data.trim().is_empty() {
            return Err(AppError::InvalidInput("Upload data cannot be empty".to_string()));
        }

        if options.folder.is_none() {
            options.folder = Some(DEFAULT_UPLOAD_FOLDER.to_string());
        }
        if options.tags.is_empty() {
            options.tags = DEFAULT_UPLOAD_TAGS.iter().map(|t| t.to_string()).collect();
        }
        validate_upload_options(&options)?;

        let data_uri = to_data_uri(base64_data, options.filename.as_deref());

        let response = match host.upload(&data_uri, &options).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err.detailed_message(), "Inline upload failed");
                return Ok((UploadResult::failure(err.detailed_message()), None));
            }
        };

        let asset = self
            .assets
            .upsert(NewAsset::from_upload(
                &response,
                options.folder.as_deref(),
                &options.tags,
                options.filename.as_deref(),
                options.user_id.as_deref(),
            ))
            .await?;

        tracing::info!(public_id = %asset.public_id, "Inline upload recorded");
        Ok((UploadResult::from(&response), Some(asset)))
    }

    /// Signed parameters for a direct upload. Defaults the folder to `large-uploads`.
    pub fn generate_upload_credentials(
        &self,
        mut options: UploadOptions,
    ) -> Result<UploadCredentials, AppError> {
        let host = self.host()?;

        if options.folder.is_none() {
            options.folder = Some(DEFAULT_LARGE_UPLOAD_FOLDER.to_string());
        }
        validate_upload_options(&options)?;

        Ok(host.generate_upload_credentials(&options)?)
    }

    /// Record the asset produced by a direct upload.
    #[tracing::instrument(skip(self, upload_result))]
    pub async fn finalize_upload(
        &self,
        public_id: &str,
        upload_result: &CloudinaryUploadResponse,
        user_id: Option<&str>,
    ) -> Result<Asset, AppError> {
        if public_id != upload_result.public_id {
            return Err(AppError::InvalidInput(format!(
                "Public ID {} does not match upload result {}",
                public_id, upload_result.public_id
            )));
        }

        let folder = public_id.rsplit_once('/').map(|(folder, _)| folder);
        let asset = self
            .assets
            .upsert(NewAsset::from_upload(
                upload_result,
                folder,
                &[],
                None,
                user_id,
            ))
            .await?;

        tracing::info!(public_id = %asset.public_id, "Direct upload finalized");
        Ok(asset)
    }

    pub async fn create_pending_upload(
        &self,
        input: CreatePendingUpload,
    ) -> Result<PendingUpload, AppError> {
        self.pending_uploads.create(input).await
    }

    pub async fn update_upload_status(
        &self,
        id: &str,
        update: UploadStatusUpdate,
    ) -> Result<PendingUpload, AppError> {
        self.pending_uploads.update_status(id, update).await
    }

    pub async fn get_uploads_by_status(
        &self,
        status: UploadStatus,
        user_id: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<PendingUpload>, AppError> {
        let limit = self.effective_limit(limit)?;
        self.pending_uploads
            .list_by_status(status, user_id, limit)
            .await
    }

    pub async fn get_pending_upload(&self, id: &str) -> Result<Option<PendingUpload>, AppError> {
        self.pending_uploads.get(id).await
    }

    pub async fn delete_pending_upload(&self, id: &str) -> Result<bool, AppError> {
        self.pending_uploads.delete(id).await
    }

    pub async fn list_assets(&self, query: &ListAssetsQuery) -> Result<Vec<Asset>, AppError> {
        query.validate()?;
        self.assets.list(query, self.default_list_limit).await
    }

    /// Newest assets for the library view. Empty while the configuration gate is closed.
    pub async fn library(&self) -> Result<Vec<Asset>, AppError> {
        if !self.check_config() {
            return Ok(Vec::new());
        }

        let query = ListAssetsQuery {
            limit: Some(DEFAULT_LIST_LIMIT),
            ..Default::default()
        };
        self.assets.list(&query, DEFAULT_LIST_LIMIT).await
    }

    pub async fn get_asset(&self, public_id: &str) -> Result<Option<Asset>, AppError> {
        self.assets.get_by_public_id(public_id).await
    }

    pub async fn update_asset(
        &self,
        public_id: &str,
        update: AssetUpdate,
    ) -> Result<Asset, AppError> {
        if let Some(tags) = &update.tags {
            validate_tags(tags).map_err(|e| AppError::InvalidInput(format!("{:#}", e)))?;
        }
        if let Some(metadata) = &update.metadata {
            validate_metadata(metadata).map_err(|e| AppError::InvalidInput(format!("{:#}", e)))?;
        }

        self.assets.update(public_id, update).await
    }

    /// Destroy on the host, then drop the registry record. A host failure leaves the
    /// record in place and is reported in the result.
    #[tracing::instrument(skip(self))]
    pub async fn delete_asset(&self, public_id: &str) -> Result<DeleteResult, AppError> {
        let host = self.host()?;

        if let Err(err) = host.destroy(public_id).await {
            tracing::warn!(error = %err.detailed_message(), "Destroy failed");
            return Ok(DeleteResult::failed(err.detailed_message()));
        }

        let removed = self.assets.delete(public_id).await?;
        tracing::info!(removed, "Asset deleted");
        Ok(DeleteResult::ok())
    }

    /// Derived delivery URL for an asset
    pub async fn transform(
        &self,
        public_id: &str,
        transformation: &Transformation,
    ) -> Result<TransformResult, AppError> {
        let host = self.host()?;

        validate_public_id(public_id).map_err(|e| AppError::InvalidInput(format!("{:#}", e)))?;
        transformation.validate_params()?;

        Ok(TransformResult {
            secure_url: host.secure_url(public_id),
            transformed_url: host.transformed_url(public_id, transformation),
        })
    }

    fn effective_limit(&self, limit: Option<u32>) -> Result<u32, AppError> {
        match limit {
            Some(0) => Err(AppError::InvalidInput("Limit must be at least 1".to_string())),
            Some(l) => Ok(l.min(studio_core::constants::MAX_LIST_LIMIT)),
            None => Ok(self.default_list_limit),
        }
    }
}

fn validate_upload_options(options: &UploadOptions) -> Result<(), AppError> {
    options.validate()?;

    if let Some(folder) = &options.folder {
        validate_folder(folder).map_err(|e| AppError::InvalidInput(format!("{:#}", e)))?;
    }
    if let Some(public_id) = &options.public_id {
        validate_public_id(public_id).map_err(|e| AppError::InvalidInput(format!("{:#}", e)))?;
    }
    validate_tags(&options.tags).map_err(|e| AppError::InvalidInput(format!("{:#}", e)))?;
    if let Some(transformation) = &options.transformation {
        transformation.validate_params()?;
    }

    Ok(())
}

/// Accept data URIs and remote URLs as-is; wrap a bare base64 payload in a data URI.
fn to_data_uri(data: &str, filename: Option<&str>) -> String {
    let data = data.trim();
    if data.starts_with("data:") || data.starts_with("https://") || data.starts_with("http://") {
        return data.to_string();
    }

    let mime = filename
        .and_then(|name| mime_guess::from_path(name).first())
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    format!("data:{};base64,{}", mime, data)
}
