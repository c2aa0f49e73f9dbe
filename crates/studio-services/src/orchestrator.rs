//! Upload orchestration
//!
//! Picks the inline or direct path for a staged file and sequences the direct path:
//! create pending record -> uploading -> credentials -> HTTP upload -> finalize ->
//! completed. Any failure after the record exists marks it `failed` with the error
//! message and is returned to the caller. There is no retry and no cancellation.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use studio_cloudinary::{encode_data_uri, MediaHost, ProgressCallback};
use studio_core::constants::{
    BASE64_UPLOAD_FOLDER, DEFAULT_DIRECT_UPLOAD_THRESHOLD_BYTES, DIRECT_UPLOAD_FOLDER,
    DIRECT_UPLOAD_USER_ID,
};
use studio_core::models::{
    Asset, CloudinaryUploadResponse, CreatePendingUpload, PendingUploadResult, UploadMethod,
    UploadOptions, UploadResult, UploadStatusUpdate,
};
use studio_core::AppError;

use crate::assets::AssetService;

/// A file picked for upload, held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct StagedFile {
    pub name: String,
    pub data: Bytes,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::InvalidInput(format!("Not a file: {}", path.display())))?
            .to_string();
        let data = tokio::fs::read(path).await?;

        Ok(Self::new(name, data))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Result of one upload attempt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    /// Path actually taken (`auto` already resolved)
    pub method: UploadMethod,
    pub result: UploadResult,
    pub asset: Option<Asset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_upload_id: Option<String>,
}

#[derive(Clone)]
pub struct UploadOrchestrator {
    service: Arc<AssetService>,
    threshold_bytes: u64,
}

impl UploadOrchestrator {
    pub fn new(service: Arc<AssetService>, threshold_bytes: u64) -> Self {
        Self {
            service,
            threshold_bytes,
        }
    }

    pub fn with_default_threshold(service: Arc<AssetService>) -> Self {
        Self::new(service, DEFAULT_DIRECT_UPLOAD_THRESHOLD_BYTES)
    }

    pub fn threshold_bytes(&self) -> u64 {
        self.threshold_bytes
    }

    pub fn resolve_method(&self, file: &StagedFile, method: UploadMethod) -> UploadMethod {
        method.resolve(file.size(), self.threshold_bytes)
    }

    /// Upload `file` into `folder` (or the path's default folder).
    #[tracing::instrument(skip(self, file, progress), fields(file.name = %file.name, file.size = file.size(), method = %method))]
    pub async fn perform_upload(
        &self,
        file: &StagedFile,
        folder: Option<&str>,
        method: UploadMethod,
        progress: Option<ProgressCallback>,
    ) -> Result<UploadOutcome, AppError> {
        self.service.ensure_configured()?;

        match self.resolve_method(file, method) {
            UploadMethod::Direct => {
                self.upload_direct(file, folder.unwrap_or(DIRECT_UPLOAD_FOLDER), progress)
                    .await
            }
            _ => {
                self.upload_base64(file, folder.unwrap_or(BASE64_UPLOAD_FOLDER), progress)
                    .await
            }
        }
    }

    async fn upload_base64(
        &self,
        file: &StagedFile,
        folder: &str,
        progress: Option<ProgressCallback>,
    ) -> Result<UploadOutcome, AppError> {
        let data_uri = encode_data_uri(&file.data, &file.name);
        report(&progress, 50);

        let options = UploadOptions {
            filename: Some(file.name.clone()),
            folder: Some(folder.to_string()),
            ..Default::default()
        };
        let (result, asset) = self.service.upload_and_record(&data_uri, options).await?;

        if !result.success {
            let message = result
                .error
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(AppError::Upload(message));
        }

        report(&progress, 100);
        Ok(UploadOutcome {
            method: UploadMethod::Base64,
            result,
            asset,
            pending_upload_id: None,
        })
    }

    async fn upload_direct(
        &self,
        file: &StagedFile,
        folder: &str,
        progress: Option<ProgressCallback>,
    ) -> Result<UploadOutcome, AppError> {
        let pending = self
            .service
            .create_pending_upload(CreatePendingUpload {
                filename: Some(file.name.clone()),
                folder: Some(folder.to_string()),
                user_id: Some(DIRECT_UPLOAD_USER_ID.to_string()),
            })
            .await?;

        match self.run_direct(&pending.id, file, folder, progress).await {
            Ok((response, asset)) => Ok(UploadOutcome {
                method: UploadMethod::Direct,
                result: UploadResult::from(&response),
                asset: Some(asset),
                pending_upload_id: Some(pending.id),
            }),
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(pending_upload_id = %pending.id, error = %message, "Direct upload failed");

                if let Err(mark_err) = self
                    .service
                    .update_upload_status(&pending.id, UploadStatusUpdate::failed(message))
                    .await
                {
                    tracing::error!(
                        pending_upload_id = %pending.id,
                        error = %mark_err,
                        "Failed to mark pending upload as failed"
                    );
                }

                Err(err)
            }
        }
    }

    async fn run_direct(
        &self,
        pending_id: &str,
        file: &StagedFile,
        folder: &str,
        progress: Option<ProgressCallback>,
    ) -> Result<(CloudinaryUploadResponse, Asset), AppError> {
        self.service
            .update_upload_status(pending_id, UploadStatusUpdate::uploading())
            .await?;

        let credentials = self.service.generate_upload_credentials(UploadOptions {
            filename: Some(file.name.clone()),
            folder: Some(folder.to_string()),
            ..Default::default()
        })?;

        let response = self
            .service
            .host()?
            .upload_direct(file.data.clone(), &file.name, &credentials, progress)
            .await?;

        let asset = self
            .service
            .finalize_upload(&response.public_id, &response, Some(DIRECT_UPLOAD_USER_ID))
            .await?;

        self.service
            .update_upload_status(
                pending_id,
                UploadStatusUpdate::completed(PendingUploadResult::from(&response)),
            )
            .await?;

        Ok((response, asset))
    }
}

fn report(progress: &Option<ProgressCallback>, percent: u8) {
    if let Some(callback) = progress {
        callback(percent);
    }
}
