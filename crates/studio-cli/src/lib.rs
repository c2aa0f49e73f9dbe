use anyhow::Context;
use serde::Serialize;
use serde_json::Value as JsonValue;
use studio_core::constants::{ENV_API_KEY, ENV_API_SECRET, ENV_CLOUD_NAME};
use studio_core::models::Radius;
use studio_core::{AppError, ErrorMetadata, LogLevel};

/// Initialize tracing for the CLI. Production environments log JSON lines.
pub fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// What the user sees when a command fails.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    pub code: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

fn log_app_error(error: &AppError) {
    let error_type = error.error_type();
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, code, "Command failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, code, "Command failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type, code, "Command failed");
        }
    }
}

impl ErrorReport {
    /// Build the report from the first `AppError` in the chain. Details stay hidden in
    /// production and for sensitive errors.
    pub fn from_error(err: &anyhow::Error, production: bool) -> Self {
        let Some(app_error) = err.chain().find_map(|e| e.downcast_ref::<AppError>()) else {
            tracing::error!(error = %format!("{:#}", err), "Command failed");
            return Self {
                error: format!("{:#}", err),
                details: None,
                error_type: None,
                code: "COMMAND_FAILED".to_string(),
                recoverable: false,
                suggested_action: None,
            };
        };

        log_app_error(app_error);

        let show_details = !production && !app_error.is_sensitive();
        Self {
            error: app_error.client_message(),
            details: show_details.then(|| app_error.detailed_message()),
            error_type: show_details.then(|| app_error.error_type().to_string()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        }
    }
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Shown in place of host-dependent output while credentials are missing.
pub fn setup_required_message() -> String {
    format!(
        "Setup required: the image host is not configured.\n\
         Set the following environment variables (or add them to .env):\n  \
         {}\n  {}\n  {}",
        ENV_CLOUD_NAME, ENV_API_KEY, ENV_API_SECRET
    )
}

/// `max` or a pixel count
pub fn parse_radius(s: &str) -> Result<Radius, String> {
    let s = s.trim();
    match s.parse::<u32>() {
        Ok(px) => Ok(Radius::Pixels(px)),
        Err(_) if s.eq_ignore_ascii_case("max") => Ok(Radius::Named("max".to_string())),
        Err(_) => Err(format!("Invalid radius '{}': expected pixels or 'max'", s)),
    }
}

pub fn parse_metadata(s: &str) -> anyhow::Result<JsonValue> {
    let value: JsonValue = serde_json::from_str(s).context("Metadata must be valid JSON")?;
    if !value.is_object() {
        anyhow::bail!("Metadata must be a JSON object");
    }
    Ok(value)
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_message_lists_variables() {
        let message = setup_required_message();
        for var in ["CLOUDINARY_CLOUD_NAME", "CLOUDINARY_API_KEY", "CLOUDINARY_API_SECRET"] {
            assert!(message.contains(var), "missing {}", var);
        }
    }

    #[test]
    fn report_carries_error_metadata() {
        let err = anyhow::Error::from(AppError::NotConfigured(
            "Cloudinary environment variables not set".into(),
        ));
        let report = ErrorReport::from_error(&err, false);

        assert_eq!(report.code, "NOT_CONFIGURED");
        assert_eq!(
            report.error,
            "Configure your Cloudinary credentials before uploading"
        );
        assert!(!report.recoverable);
        assert!(report
            .suggested_action
            .as_deref()
            .unwrap()
            .contains("CLOUDINARY_API_KEY"));
        assert_eq!(report.error_type.as_deref(), Some("NotConfigured"));
        assert!(report.details.unwrap().contains("environment variables not set"));
    }

    #[test]
    fn report_finds_app_error_under_context() {
        let err = anyhow::Error::from(AppError::Upload("status 400".into()))
            .context("Direct upload of big.png");
        let report = ErrorReport::from_error(&err, false);
        assert_eq!(report.code, "UPLOAD_FAILED");
        assert_eq!(report.error, "Upload failed: status 400");
        assert!(report.recoverable);
    }

    #[test]
    fn report_hides_details_in_production_and_for_sensitive_errors() {
        let err = anyhow::Error::from(AppError::NotFound("Asset uploads/cat not found".into()));
        let report = ErrorReport::from_error(&err, true);
        assert_eq!(report.error, "Asset uploads/cat not found");
        assert!(report.details.is_none());
        assert!(report.error_type.is_none());

        let err = anyhow::Error::from(AppError::Internal("pool exhausted".into()));
        let report = ErrorReport::from_error(&err, false);
        assert_eq!(report.error, "Internal error");
        assert!(report.details.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("details").is_none());
        assert_eq!(json["code"], "INTERNAL_ERROR");
    }

    #[test]
    fn report_falls_back_for_plain_errors() {
        let err = anyhow::anyhow!("Nothing to update").context("update uploads/cat");
        let report = ErrorReport::from_error(&err, false);
        assert_eq!(report.code, "COMMAND_FAILED");
        assert_eq!(report.error, "update uploads/cat: Nothing to update");
        assert!(report.suggested_action.is_none());
    }

    #[test]
    fn radius_accepts_pixels_and_max() {
        assert_eq!(parse_radius("20").unwrap(), Radius::Pixels(20));
        assert_eq!(parse_radius("MAX").unwrap(), Radius::Named("max".into()));
        assert!(parse_radius("round").is_err());
    }

    #[test]
    fn metadata_must_be_object() {
        assert!(parse_metadata(r#"{"alt":"cat"}"#).is_ok());
        assert!(parse_metadata("[1,2]").is_err());
        assert!(parse_metadata("not json").is_err());
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("hello", 0), "...");
    }
}
