//! Error types module
//!
//! This module provides the core error type used throughout the studio. All errors are
//! unified under the `AppError` enum which can represent registry, image host, upload,
//! validation and configuration failures.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

use crate::models::UploadStatus;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for remote failures the user can act on
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the user
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "NOT_CONFIGURED")
    fn error_code(&self) -> &'static str;

    /// Whether repeating the same attempt could succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from the user
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Image host error: {0}")]
    Remote(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid upload status transition: {from} -> {to}")]
    InvalidStatusTransition { from: UploadStatus, to: UploadStatus },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (&'static str, bool, Option<&'static str>, bool, LogLevel) {
    match err {
        AppError::NotConfigured(_) => (
            "NOT_CONFIGURED",
            false,
            Some("Set CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET"),
            false,
            LogLevel::Warn,
        ),
        AppError::Database(_) => (
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Remote(_) => (
            "IMAGE_HOST_ERROR",
            true,
            Some("Check the image host credentials and retry"),
            false,
            LogLevel::Warn,
        ),
        AppError::Upload(_) => (
            "UPLOAD_FAILED",
            true,
            Some("Start a new upload attempt"),
            false,
            LogLevel::Warn,
        ),
        AppError::InvalidInput(_) => (
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            "NOT_FOUND",
            false,
            Some("Verify the public ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidStatusTransition { .. } => (
            "INVALID_STATUS_TRANSITION",
            false,
            Some("Start a new upload attempt"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error output
    pub fn error_type(&self) -> &str {
        match self {
            AppError::NotConfigured(_) => "NotConfigured",
            AppError::Database(_) => "Database",
            AppError::Remote(_) => "Remote",
            AppError::Upload(_) => "Upload",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::InvalidStatusTransition { .. } => "InvalidStatusTransition",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::NotConfigured(_) => {
                "Configure your Cloudinary credentials before uploading".to_string()
            }
            AppError::Database(_) => "Failed to access the asset registry".to_string(),
            AppError::Remote(ref msg) => msg.clone(),
            AppError::Upload(ref msg) => format!("Upload failed: {}", msg),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::InvalidStatusTransition { from, to } => {
                format!("Upload cannot move from {} to {}", from, to)
            }
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal error".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_not_configured() {
        let err = AppError::NotConfigured("missing".to_string());
        assert_eq!(err.error_code(), "NOT_CONFIGURED");
        assert!(!err.is_recoverable());
        assert!(err
            .suggested_action()
            .unwrap()
            .contains("CLOUDINARY_API_SECRET"));
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_upload() {
        let err = AppError::Upload("Upload failed with status 500: Internal Server Error".into());
        assert_eq!(err.error_code(), "UPLOAD_FAILED");
        assert!(err.is_recoverable());
        assert!(!err.is_sensitive());
        assert!(err.client_message().contains("status 500"));
    }

    #[test]
    fn test_error_metadata_internal_is_sensitive() {
        let err = AppError::from(anyhow::anyhow!("pool exhausted"));
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "Internal error");
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_status_transition_message() {
        let err = AppError::InvalidStatusTransition {
            from: UploadStatus::Completed,
            to: UploadStatus::Uploading,
        };
        assert_eq!(
            err.to_string(),
            "Invalid upload status transition: completed -> uploading"
        );
        assert_eq!(err.error_type(), "InvalidStatusTransition");
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let inner = anyhow::anyhow!("disk full").context("writing registry");
        let err = AppError::from(inner);
        let details = err.detailed_message();
        assert!(details.contains("Caused by"));
    }
}
