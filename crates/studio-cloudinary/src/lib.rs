//! HTTP client for the Cloudinary image host.
//!
//! Covers request signing, inline (data URI) uploads, signed credentials for direct
//! uploads, the direct multipart upload itself with progress reporting, destroy, and
//! delivery URL building. The service layer talks to the host through the
//! [`MediaHost`] trait so it can be swapped for a mock in tests.

pub mod api;
pub mod error;
pub mod host;
pub mod signing;
pub mod upload;

pub use api::DestroyResponse;
pub use error::HostError;
pub use host::{HostResult, MediaHost};
pub use signing::sign_params;
pub use upload::{encode_data_uri, ProgressCallback};

use reqwest::Client;
use std::time::Duration;
use studio_core::{
    AppError, CloudinaryCredentials, SignatureAlgorithm, StudioConfig, TransformUrlBuilder,
};

/// Cloudinary client bound to one account.
///
/// `timeout_secs` bounds connection setup and each signed API call. Direct uploads carry
/// the whole file and have no overall deadline.
#[derive(Clone, Debug)]
pub struct CloudinaryClient {
    client: Client,
    credentials: CloudinaryCredentials,
    signature_algorithm: SignatureAlgorithm,
    request_timeout: Duration,
    api_base_url: String,
    urls: TransformUrlBuilder,
}

impl CloudinaryClient {
    pub fn new(
        credentials: CloudinaryCredentials,
        api_base_url: &str,
        delivery_base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, HostError> {
        let request_timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .map_err(HostError::Transport)?;

        let urls = TransformUrlBuilder::new(delivery_base_url, credentials.cloud_name.clone());

        Ok(Self {
            client,
            credentials,
            signature_algorithm: SignatureAlgorithm::default(),
            request_timeout,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            urls,
        })
    }

    pub fn with_signature_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.signature_algorithm = algorithm;
        self
    }

    /// Build a client from the studio configuration. Fails with `NotConfigured` when the
    /// configuration gate is closed.
    pub fn from_config(config: &StudioConfig) -> Result<Self, AppError> {
        let credentials = config.credentials()?.clone();
        let client = Self::new(
            credentials,
            &config.api_base_url,
            &config.delivery_base_url,
            config.http_timeout_secs,
        )?;
        Ok(client.with_signature_algorithm(config.signature_algorithm))
    }

    pub fn cloud_name(&self) -> &str {
        &self.credentials.cloud_name
    }

    /// Upload API endpoint for an image action such as `upload` or `destroy`.
    pub fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{}",
            self.api_base_url, self.credentials.cloud_name, action
        )
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn credentials(&self) -> &CloudinaryCredentials {
        &self.credentials
    }

    pub(crate) fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.signature_algorithm
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub(crate) fn urls(&self) -> &TransformUrlBuilder {
        &self.urls
    }
}
