//! Pending upload models for tracking direct uploads

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::upload::CloudinaryUploadResponse;

/// Lifecycle of a direct upload attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Completed,
    Failed,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Pending => "pending",
            UploadStatus::Uploading => "uploading",
            UploadStatus::Completed => "completed",
            UploadStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStatus::Completed | UploadStatus::Failed)
    }

    /// Status only moves forward: pending -> uploading -> {completed | failed}.
    /// An attempt that dies before the transfer starts may go pending -> failed.
    pub fn can_transition_to(&self, next: UploadStatus) -> bool {
        matches!(
            (self, next),
            (UploadStatus::Pending, UploadStatus::Uploading)
                | (UploadStatus::Pending, UploadStatus::Failed)
                | (UploadStatus::Uploading, UploadStatus::Completed)
                | (UploadStatus::Uploading, UploadStatus::Failed)
        )
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(UploadStatus::Pending),
            "uploading" => Ok(UploadStatus::Uploading),
            "completed" => Ok(UploadStatus::Completed),
            "failed" => Ok(UploadStatus::Failed),
            other => Err(format!(
                "Invalid upload status: {}. Must be one of: pending, uploading, completed, failed",
                other
            )),
        }
    }
}

/// Asset fields recorded on a completed pending upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUploadResult {
    pub public_id: String,
    pub secure_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
}

impl From<&CloudinaryUploadResponse> for PendingUploadResult {
    fn from(response: &CloudinaryUploadResponse) -> Self {
        Self {
            public_id: response.public_id.clone(),
            secure_url: response.secure_url.clone(),
            width: response.width,
            height: response.height,
            format: response.format.clone(),
            bytes: response.bytes,
        }
    }
}

/// Tracking record for one direct upload attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUpload {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PendingUploadResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePendingUpload {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Status change for a pending upload, with the payload for terminal states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatusUpdate {
    pub status: UploadStatus,
    #[serde(default)]
    pub result: Option<PendingUploadResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl UploadStatusUpdate {
    pub fn uploading() -> Self {
        Self {
            status: UploadStatus::Uploading,
            result: None,
            error: None,
        }
    }

    pub fn completed(result: PendingUploadResult) -> Self {
        Self {
            status: UploadStatus::Completed,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: UploadStatus::Failed,
            result: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [UploadStatus; 4] = [
        UploadStatus::Pending,
        UploadStatus::Uploading,
        UploadStatus::Completed,
        UploadStatus::Failed,
    ];

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(UploadStatus::Pending.can_transition_to(UploadStatus::Uploading));
        assert!(UploadStatus::Pending.can_transition_to(UploadStatus::Failed));
        assert!(UploadStatus::Uploading.can_transition_to(UploadStatus::Completed));
        assert!(UploadStatus::Uploading.can_transition_to(UploadStatus::Failed));
    }

    #[test]
    fn terminal_states_never_move() {
        for from in [UploadStatus::Completed, UploadStatus::Failed] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!from.can_transition_to(to), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn no_backward_or_self_transitions() {
        for status in ALL {
            assert!(!status.can_transition_to(status));
        }
        assert!(!UploadStatus::Uploading.can_transition_to(UploadStatus::Pending));
        assert!(!UploadStatus::Pending.can_transition_to(UploadStatus::Completed));
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<UploadStatus>().unwrap(), status);
        }
        assert!("done".parse::<UploadStatus>().is_err());
    }
}
