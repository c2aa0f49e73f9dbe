//! Upload API calls: inline upload, signed credentials, destroy, and delivery URLs.

use std::collections::BTreeMap;

use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use studio_core::models::{
    CloudinaryUploadResponse, Transformation, UploadCredentials, UploadOptions,
};

use crate::signing::signed;
use crate::{CloudinaryClient, HostError};

/// Body of a destroy call: `ok` or `not found` on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyResponse {
    pub result: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Check the status and decode a JSON body. The host's error message is kept when a
/// non-2xx body carries one.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, HostError> {
    let status = response.status();
    let body = response.text().await.map_err(HostError::Transport)?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error.message)
            .ok();
        return Err(HostError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| HostError::Parse(e.to_string()))
}

/// Parameters shared by inline uploads and credential generation.
fn upload_params(options: &UploadOptions) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    if let Some(folder) = &options.folder {
        params.insert("folder".to_string(), folder.clone());
    }
    if let Some(public_id) = &options.public_id {
        params.insert("public_id".to_string(), public_id.clone());
    }
    if let Some(filename) = &options.filename {
        params.insert("filename_override".to_string(), filename.clone());
    }
    if !options.tags.is_empty() {
        params.insert("tags".to_string(), options.tags.join(","));
    }
    if let Some(segment) = options
        .transformation
        .as_ref()
        .and_then(Transformation::to_url_segment)
    {
        params.insert("transformation".to_string(), segment);
    }
    params
}

impl CloudinaryClient {
    fn sign(&self, params: BTreeMap<String, String>) -> BTreeMap<String, String> {
        let credentials = self.credentials();
        signed(
            params,
            &credentials.api_key,
            &credentials.api_secret,
            chrono::Utc::now().timestamp(),
            self.signature_algorithm(),
        )
    }

    async fn post_signed<T: DeserializeOwned>(
        &self,
        action: &str,
        params: BTreeMap<String, String>,
        file: Option<String>,
    ) -> Result<T, HostError> {
        let mut form = Form::new();
        for (key, value) in self.sign(params) {
            form = form.text(key, value);
        }
        if let Some(file) = file {
            form = form.text("file", file);
        }

        let response = self
            .client()
            .post(self.endpoint(action))
            .timeout(self.request_timeout())
            .multipart(form)
            .send()
            .await
            .map_err(HostError::Transport)?;

        read_json(response).await
    }

    /// Upload a data URI (or remote URL) in one signed call.
    #[tracing::instrument(skip(self, data, options), fields(folder = ?options.folder))]
    pub async fn upload(
        &self,
        data: &str,
        options: &UploadOptions,
    ) -> Result<CloudinaryUploadResponse, HostError> {
        let result: CloudinaryUploadResponse = self
            .post_signed("upload", upload_params(options), Some(data.to_string()))
            .await?;

        tracing::info!(public_id = %result.public_id, "Inline upload completed");
        Ok(result)
    }

    /// Sign the parameters for a direct upload. Purely local.
    pub fn generate_upload_credentials(
        &self,
        options: &UploadOptions,
    ) -> Result<UploadCredentials, HostError> {
        if let Some(folder) = &options.folder {
            if folder.trim().is_empty() {
                return Err(HostError::InvalidRequest("folder cannot be blank".to_string()));
            }
        }

        Ok(UploadCredentials {
            upload_url: self.endpoint("upload"),
            upload_params: self.sign(upload_params(options)),
        })
    }

    /// Remove an asset from the host. A missing asset counts as removed.
    #[tracing::instrument(skip(self))]
    pub async fn destroy(&self, public_id: &str) -> Result<DestroyResponse, HostError> {
        let mut params = BTreeMap::new();
        params.insert("public_id".to_string(), public_id.to_string());
        params.insert("invalidate".to_string(), "true".to_string());

        let response: DestroyResponse = self.post_signed("destroy", params, None).await?;

        match response.result.as_str() {
            "ok" | "not found" => Ok(response),
            other => Err(HostError::Rejected(other.to_string())),
        }
    }

    pub fn secure_url(&self, public_id: &str) -> String {
        self.urls().secure_url(public_id)
    }

    pub fn transformed_url(&self, public_id: &str, transformation: &Transformation) -> String {
        self.urls().build(public_id, transformation)
    }
}
