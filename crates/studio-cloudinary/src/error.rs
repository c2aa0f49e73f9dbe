//! Normalized error type for calls to the image host

use studio_core::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    /// Non-2xx response. `message` is the host's own error text when the body carried one.
    #[error("Upload failed with status {status}: {reason}")]
    Status {
        status: u16,
        reason: String,
        message: Option<String>,
    },

    #[error("Network error during upload: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Request could not be built, e.g. credentials without an upload URL
    #[error("Invalid upload request: {0}")]
    InvalidRequest(String),

    /// 2xx response whose result field reports a refusal
    #[error("Image host rejected the request: {0}")]
    Rejected(String),
}

impl HostError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            HostError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Display text with the host's message appended when one was returned.
    pub fn detailed_message(&self) -> String {
        match self {
            HostError::Status {
                message: Some(message),
                ..
            } => format!("{} ({})", self, message),
            _ => self.to_string(),
        }
    }
}

impl From<HostError> for AppError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::InvalidRequest(_) => AppError::Upload(err.to_string()),
            other => AppError::Remote(other.detailed_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_names_status_and_reason() {
        let err = HostError::Status {
            status: 400,
            reason: "Bad Request".into(),
            message: Some("Invalid Signature".into()),
        };
        assert_eq!(err.to_string(), "Upload failed with status 400: Bad Request");
        assert_eq!(
            err.detailed_message(),
            "Upload failed with status 400: Bad Request (Invalid Signature)"
        );
    }

    #[test]
    fn converts_into_app_error() {
        let err: AppError = HostError::Parse("expected value".into()).into();
        assert!(matches!(err, AppError::Remote(ref m) if m.starts_with("Failed to parse response")));

        let err: AppError = HostError::InvalidRequest("missing upload URL".into()).into();
        assert!(matches!(err, AppError::Upload(_)));
    }
}
