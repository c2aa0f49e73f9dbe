//! Editing session state, independent of any UI
//!
//! Holds at most one staged file, the asset selected for editing, and the
//! transformation being previewed for it.

use std::sync::Arc;

use studio_cloudinary::ProgressCallback;
use studio_core::models::{Asset, DeleteResult, Transformation, UploadMethod};
use studio_core::{AppError, PresetDefinition};

use crate::assets::AssetService;
use crate::orchestrator::{StagedFile, UploadOrchestrator, UploadOutcome};

/// Parameters for a derived-URL preview of the selected asset
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRequest {
    pub public_id: String,
    pub transformation: Transformation,
}

/// State holder for an interactive front end that embeds this crate and keeps one
/// session alive across user actions. The `studio` CLI is stateless per invocation
/// and calls [`AssetService`] and [`UploadOrchestrator`] directly.
pub struct StudioSession {
    service: Arc<AssetService>,
    orchestrator: UploadOrchestrator,
    staged: Option<StagedFile>,
    selected: Option<Asset>,
    transformation: Transformation,
}

impl StudioSession {
    pub fn new(service: Arc<AssetService>, orchestrator: UploadOrchestrator) -> Self {
        Self {
            service,
            orchestrator,
            staged: None,
            selected: None,
            transformation: Transformation::default(),
        }
    }

    /// Stage a file, replacing any file already staged.
    pub fn stage(&mut self, file: StagedFile) {
        self.staged = Some(file);
    }

    pub fn staged(&self) -> Option<&StagedFile> {
        self.staged.as_ref()
    }

    pub fn clear_staged(&mut self) {
        self.staged = None;
    }

    /// Upload the staged file. The stage is cleared only when the upload succeeds, so a
    /// failed attempt can be retried with the same file.
    pub async fn upload_staged(
        &mut self,
        method: UploadMethod,
        progress: Option<ProgressCallback>,
    ) -> Result<UploadOutcome, AppError> {
        let file = self
            .staged
            .as_ref()
            .ok_or_else(|| AppError::InvalidInput("No file staged for upload".to_string()))?;

        let outcome = self
            .orchestrator
            .perform_upload(file, None, method, progress)
            .await?;

        self.staged = None;
        Ok(outcome)
    }

    pub fn select(&mut self, asset: Asset) {
        self.selected = Some(asset);
    }

    pub fn selected(&self) -> Option<&Asset> {
        self.selected.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    /// Merge a preset's settings over the current transformation.
    pub fn apply_preset(&mut self, preset: &PresetDefinition) {
        self.transformation.merge(&preset.transformation());
    }

    pub fn apply_transformation(&mut self, transformation: &Transformation) {
        self.transformation.merge(transformation);
    }

    pub fn reset_transformation(&mut self) {
        self.transformation = Transformation::default();
    }

    /// Drop the selection if the selected asset is no longer in `library`.
    /// Returns true when the selection was cleared.
    pub fn sync_with_library(&mut self, library: &[Asset]) -> bool {
        let gone = self
            .selected
            .as_ref()
            .is_some_and(|s| !library.iter().any(|a| a.public_id == s.public_id));

        if gone {
            self.selected = None;
        }
        gone
    }

    /// Fetch the library and re-check the selection against it.
    pub async fn refresh_library(&mut self) -> Result<Vec<Asset>, AppError> {
        let library = self.service.library().await?;
        self.sync_with_library(&library);
        Ok(library)
    }

    /// Delete an asset. Clears the selection when the deleted asset was selected.
    pub async fn delete_asset(&mut self, public_id: &str) -> Result<DeleteResult, AppError> {
        let result = self.service.delete_asset(public_id).await?;

        let was_selected = self
            .selected
            .as_ref()
            .is_some_and(|s| s.public_id == public_id);
        if result.success && was_selected {
            self.selected = None;
        }

        Ok(result)
    }

    pub fn preview_request(&self) -> Option<PreviewRequest> {
        self.selected.as_ref().map(|asset| PreviewRequest {
            public_id: asset.public_id.clone(),
            transformation: self.transformation.clone(),
        })
    }

    /// URL to show for the selected asset: the derived URL when one can be built,
    /// otherwise the asset's own secure URL.
    pub async fn preview_url(&self) -> Option<String> {
        let request = self.preview_request()?;
        let fallback = self.selected.as_ref().map(|a| a.secure_url.clone());

        if request.transformation.is_empty() {
            return fallback;
        }

        match self
            .service
            .transform(&request.public_id, &request.transformation)
            .await
        {
            Ok(result) => Some(result.transformed_url),
            Err(err) => {
                tracing::warn!(public_id = %request.public_id, error = %err, "Preview transform failed");
                fallback
            }
        }
    }
}
