use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::transformation::Transformation;

/// How a file travels to the image host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMethod {
    /// Encoded inline and sent through the backend in one call
    Base64,
    /// Sent straight to the host with signed credentials
    Direct,
    /// Picked from the file size
    #[default]
    Auto,
}

impl UploadMethod {
    /// Resolve `Auto` against the size threshold. Explicit methods are returned unchanged.
    pub fn resolve(self, file_size: u64, threshold_bytes: u64) -> UploadMethod {
        match self {
            UploadMethod::Auto if file_size >= threshold_bytes => UploadMethod::Direct,
            UploadMethod::Auto => UploadMethod::Base64,
            explicit => explicit,
        }
    }
}

impl FromStr for UploadMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "base64" | "inline" => Ok(UploadMethod::Base64),
            "direct" => Ok(UploadMethod::Direct),
            "auto" => Ok(UploadMethod::Auto),
            other => Err(format!(
                "Invalid upload method: {}. Must be one of: base64, direct, auto",
                other
            )),
        }
    }
}

impl fmt::Display for UploadMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UploadMethod::Base64 => "base64",
            UploadMethod::Direct => "direct",
            UploadMethod::Auto => "auto",
        })
    }
}

/// Options forwarded with an upload or a credential request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadOptions {
    #[validate(length(min = 1, max = 255, message = "Filename must be between 1 and 255 characters"))]
    #[serde(default)]
    pub filename: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Folder must be between 1 and 255 characters"))]
    #[serde(default)]
    pub folder: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Public ID must be between 1 and 255 characters"))]
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub transformation: Option<Transformation>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Signed parameters for a direct upload. `upload_params` are posted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCredentials {
    pub upload_url: String,
    pub upload_params: BTreeMap<String, String>,
}

/// Upload response body returned by the image host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudinaryUploadResponse {
    pub public_id: String,
    pub secure_url: String,
    pub url: String,
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "type")]
    pub delivery_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
}

/// Outcome of an inline upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
}

impl UploadResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            public_id: None,
            secure_url: None,
            width: None,
            height: None,
            format: None,
            bytes: None,
        }
    }
}

impl From<&CloudinaryUploadResponse> for UploadResult {
    fn from(response: &CloudinaryUploadResponse) -> Self {
        Self {
            success: true,
            error: None,
            public_id: Some(response.public_id.clone()),
            secure_url: Some(response.secure_url.clone()),
            width: response.width,
            height: response.height,
            format: Some(response.format.clone()),
            bytes: response.bytes,
        }
    }
}
