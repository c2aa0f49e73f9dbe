//! Image host abstraction
//!
//! The service layer depends on this trait rather than on [`CloudinaryClient`] so that
//! tests can run against an in-process host.

use async_trait::async_trait;
use bytes::Bytes;
use studio_core::models::{
    CloudinaryUploadResponse, Transformation, UploadCredentials, UploadOptions,
};

use crate::{CloudinaryClient, HostError, ProgressCallback};

/// Result type for image host operations
pub type HostResult<T> = Result<T, HostError>;

#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Upload a data URI in one signed call
    async fn upload(
        &self,
        data_uri: &str,
        options: &UploadOptions,
    ) -> HostResult<CloudinaryUploadResponse>;

    /// Sign the parameters for a direct upload
    fn generate_upload_credentials(&self, options: &UploadOptions)
        -> HostResult<UploadCredentials>;

    /// Send raw file bytes with previously generated credentials
    async fn upload_direct(
        &self,
        data: Bytes,
        filename: &str,
        credentials: &UploadCredentials,
        progress: Option<ProgressCallback>,
    ) -> HostResult<CloudinaryUploadResponse>;

    /// Remove an asset. Succeeds when the asset is already gone.
    async fn destroy(&self, public_id: &str) -> HostResult<()>;

    fn secure_url(&self, public_id: &str) -> String;

    fn transformed_url(&self, public_id: &str, transformation: &Transformation) -> String;
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    async fn upload(
        &self,
        data_uri: &str,
        options: &UploadOptions,
    ) -> HostResult<CloudinaryUploadResponse> {
        CloudinaryClient::upload(self, data_uri, options).await
    }

    fn generate_upload_credentials(
        &self,
        options: &UploadOptions,
    ) -> HostResult<UploadCredentials> {
        CloudinaryClient::generate_upload_credentials(self, options)
    }

    async fn upload_direct(
        &self,
        data: Bytes,
        filename: &str,
        credentials: &UploadCredentials,
        progress: Option<ProgressCallback>,
    ) -> HostResult<CloudinaryUploadResponse> {
        CloudinaryClient::upload_direct(self, data, filename, credentials, progress).await
    }

    async fn destroy(&self, public_id: &str) -> HostResult<()> {
        CloudinaryClient::destroy(self, public_id).await.map(|_| ())
    }

    fn secure_url(&self, public_id: &str) -> String {
        CloudinaryClient::secure_url(self, public_id)
    }

    fn transformed_url(&self, public_id: &str, transformation: &Transformation) -> String {
        CloudinaryClient::transformed_url(self, public_id, transformation)
    }
}
