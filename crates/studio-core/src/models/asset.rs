use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use super::upload::CloudinaryUploadResponse;

/// Stored image record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub public_id: String,
    pub cloudinary_url: String,
    pub secure_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    pub fn has_all_tags(&self, tags: &[String]) -> bool {
        tags.iter().all(|t| self.tags.contains(t))
    }
}

/// Registry input for a freshly uploaded asset. Upserted by `public_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub public_id: String,
    pub cloudinary_url: String,
    pub secure_url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bytes: Option<u64>,
    pub format: String,
    pub folder: Option<String>,
    pub tags: Vec<String>,
    pub metadata: Option<JsonValue>,
    pub original_filename: Option<String>,
    pub user_id: Option<String>,
}

impl NewAsset {
    /// Build from a host upload response. The response's own folder, tags and
    /// original filename win over the fallbacks.
    pub fn from_upload(
        response: &CloudinaryUploadResponse,
        folder: Option<&str>,
        tags: &[String],
        original_filename: Option<&str>,
        user_id: Option<&str>,
    ) -> Self {
        let folder = response
            .folder
            .clone()
            .filter(|f| !f.is_empty())
            .or_else(|| folder.map(str::to_string));
        let tags = response
            .tags
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| tags.to_vec());

        Self {
            public_id: response.public_id.clone(),
            cloudinary_url: response.url.clone(),
            secure_url: response.secure_url.clone(),
            width: response.width,
            height: response.height,
            bytes: response.bytes,
            format: response.format.clone(),
            folder,
            tags,
            metadata: None,
            original_filename: response
                .original_filename
                .clone()
                .or_else(|| original_filename.map(str::to_string)),
            user_id: user_id.map(str::to_string),
        }
    }
}

/// Field used to order asset listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetOrderBy {
    #[default]
    #[serde(rename = "uploadedAt")]
    UploadedAt,
    #[serde(rename = "updatedAt")]
    UpdatedAt,
}

impl AssetOrderBy {
    pub fn column(&self) -> &'static str {
        match self {
            AssetOrderBy::UploadedAt => "uploaded_at",
            AssetOrderBy::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for AssetOrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', '-'], "").as_str() {
            "uploadedat" | "uploaded" => Ok(AssetOrderBy::UploadedAt),
            "updatedat" | "updated" => Ok(AssetOrderBy::UpdatedAt),
            other => Err(format!(
                "Invalid order field: {}. Must be one of: uploadedAt, updatedAt",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("Invalid order: {}. Must be asc or desc", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}

/// Filter, sort and pagination for asset listings. Passed through unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListAssetsQuery {
    #[serde(default)]
    pub folder: Option<String>,
    /// Assets must carry every listed tag
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub order_by: AssetOrderBy,
    #[serde(default)]
    pub order: SortOrder,
    #[validate(range(min = 1, max = 500))]
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Partial update for an asset. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetUpdate {
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<JsonValue>,
}

impl AssetUpdate {
    pub fn is_empty(&self) -> bool {
        self.tags.is_none() && self.metadata.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeleteResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Derived URL for an asset and its plain secure URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    pub secure_url: String,
    pub transformed_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str) -> CloudinaryUploadResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn new_asset_prefers_response_fields() {
        let r = response(
            r#"{"public_id":"uploads/cat","secure_url":"https://x/cat.jpg","url":"http://x/cat.jpg","format":"jpg","folder":"uploads","tags":["pets"],"original_filename":"cat"}"#,
        );
        let asset = NewAsset::from_upload(
            &r,
            Some("base64-uploads"),
            &["user-content".to_string()],
            Some("cat.jpg"),
            None,
        );
        assert_eq!(asset.folder.as_deref(), Some("uploads"));
        assert_eq!(asset.tags, vec!["pets".to_string()]);
        assert_eq!(asset.original_filename.as_deref(), Some("cat"));
        assert_eq!(asset.cloudinary_url, "http://x/cat.jpg");
    }

    #[test]
    fn new_asset_falls_back_to_request_values() {
        let r = response(
            r#"{"public_id":"cat","secure_url":"https://x/cat.jpg","url":"http://x/cat.jpg","format":"jpg","folder":""}"#,
        );
        let asset = NewAsset::from_upload(
            &r,
            Some("direct-uploads"),
            &["user-content".to_string()],
            Some("cat.jpg"),
            Some("user-initiated"),
        );
        assert_eq!(asset.folder.as_deref(), Some("direct-uploads"));
        assert_eq!(asset.tags, vec!["user-content".to_string()]);
        assert_eq!(asset.original_filename.as_deref(), Some("cat.jpg"));
        assert_eq!(asset.user_id.as_deref(), Some("user-initiated"));
    }

    #[test]
    fn order_by_parses_both_spellings() {
        assert_eq!(
            "uploadedAt".parse::<AssetOrderBy>().unwrap(),
            AssetOrderBy::UploadedAt
        );
        assert_eq!(
            "updated_at".parse::<AssetOrderBy>().unwrap(),
            AssetOrderBy::UpdatedAt
        );
        assert!("size".parse::<AssetOrderBy>().is_err());
    }

    #[test]
    fn list_query_defaults_to_newest_first() {
        let query = ListAssetsQuery::default();
        assert_eq!(query.order, SortOrder::Desc);
        assert_eq!(query.order_by, AssetOrderBy::UploadedAt);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn list_query_rejects_zero_limit() {
        let query = ListAssetsQuery {
            limit: Some(0),
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn list_query_deserializes_camel_case() {
        let query: ListAssetsQuery = serde_json::from_str(
            r#"{"folder":"uploads","orderBy":"updatedAt","order":"asc","limit":10}"#,
        )
        .unwrap();
        assert_eq!(query.folder.as_deref(), Some("uploads"));
        assert_eq!(query.order_by, AssetOrderBy::UpdatedAt);
        assert_eq!(query.order, SortOrder::Asc);
        assert_eq!(query.limit, Some(10));
    }
}
