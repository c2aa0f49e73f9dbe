//! Configuration module
//!
//! This module provides the image host credentials, the configuration gate that decides
//! whether the studio can talk to the host at all, and the runtime settings for the
//! registry database, HTTP client and upload routing.

use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::Context;

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_DATABASE_URL, DEFAULT_DELIVERY_BASE_URL,
    DEFAULT_DIRECT_UPLOAD_THRESHOLD_BYTES, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_LIST_LIMIT,
    ENV_API_KEY, ENV_API_SECRET, ENV_CLOUD_NAME, ENV_SIGNATURE_ALGORITHM, MAX_LIST_LIMIT,
};
use crate::error::AppError;

/// Credentials for the image host account.
#[derive(Clone, PartialEq, Eq)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl fmt::Debug for CloudinaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl CloudinaryCredentials {
    /// Build credentials only when all three values are present and non-empty.
    pub fn from_values(
        cloud_name: Option<String>,
        api_key: Option<String>,
        api_secret: Option<String>,
    ) -> Option<Self> {
        if !is_configured(
            cloud_name.as_deref(),
            api_key.as_deref(),
            api_secret.as_deref(),
        ) {
            return None;
        }

        let trimmed = |v: Option<String>| v.map(|s| s.trim().to_string());
        Some(Self {
            cloud_name: trimmed(cloud_name)?,
            api_key: trimmed(api_key)?,
            api_secret: trimmed(api_secret)?,
        })
    }

}

/// Digest used to sign host requests. Accounts verify SHA-1 unless switched to SHA-256.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1 => "sha1",
            SignatureAlgorithm::Sha256 => "sha256",
        }
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(SignatureAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(SignatureAlgorithm::Sha256),
            other => Err(format!(
                "unknown signature algorithm '{}': expected sha1 or sha256",
                other
            )),
        }
    }
}

/// Configuration gate: true only if all three credential values are non-empty.
pub fn is_configured(
    cloud_name: Option<&str>,
    api_key: Option<&str>,
    api_secret: Option<&str>,
) -> bool {
    [cloud_name, api_key, api_secret]
        .iter()
        .all(|v| v.map(|s| !s.trim().is_empty()).unwrap_or(false))
}

/// Runtime configuration for the studio.
#[derive(Clone, Debug)]
pub struct StudioConfig {
    /// `None` when the configuration gate is closed.
    pub credentials: Option<CloudinaryCredentials>,
    pub signature_algorithm: SignatureAlgorithm,
    pub database_url: String,
    pub api_base_url: String,
    pub delivery_base_url: String,
    pub direct_upload_threshold_bytes: u64,
    pub http_timeout_secs: u64,
    pub default_list_limit: u32,
    pub environment: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            signature_algorithm: SignatureAlgorithm::default(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            delivery_base_url: DEFAULT_DELIVERY_BASE_URL.to_string(),
            direct_upload_threshold_bytes: DEFAULT_DIRECT_UPLOAD_THRESHOLD_BYTES,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            default_list_limit: DEFAULT_LIST_LIMIT,
            environment: "development".to_string(),
        }
    }
}

impl StudioConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let credentials = CloudinaryCredentials::from_values(
            lookup(ENV_CLOUD_NAME),
            lookup(ENV_API_KEY),
            lookup(ENV_API_SECRET),
        );

        let signature_algorithm = match lookup(ENV_SIGNATURE_ALGORITHM) {
            Some(v) => v
                .parse::<SignatureAlgorithm>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Invalid {}", ENV_SIGNATURE_ALGORITHM))?,
            None => defaults.signature_algorithm,
        };

        let database_url = lookup("STUDIO_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .unwrap_or(defaults.database_url);

        let api_base_url = lookup("CLOUDINARY_API_BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let delivery_base_url = lookup("CLOUDINARY_DELIVERY_BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or(defaults.delivery_base_url);

        let direct_upload_threshold_bytes = match lookup("STUDIO_DIRECT_UPLOAD_THRESHOLD_BYTES") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .context("STUDIO_DIRECT_UPLOAD_THRESHOLD_BYTES must be a number of bytes")?,
            None => defaults.direct_upload_threshold_bytes,
        };

        let http_timeout_secs = match lookup("STUDIO_HTTP_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .context("STUDIO_HTTP_TIMEOUT_SECS must be a number of seconds")?,
            None => defaults.http_timeout_secs,
        };

        let default_list_limit = match lookup("STUDIO_LIST_LIMIT") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .context("STUDIO_LIST_LIMIT must be a positive integer")?,
            None => defaults.default_list_limit,
        };

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or(defaults.environment);

        Ok(Self {
            credentials,
            signature_algorithm,
            database_url,
            api_base_url,
            delivery_base_url,
            direct_upload_threshold_bytes,
            http_timeout_secs,
            default_list_limit,
            environment,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.direct_upload_threshold_bytes == 0 {
            anyhow::bail!("STUDIO_DIRECT_UPLOAD_THRESHOLD_BYTES must be greater than 0");
        }

        if self.default_list_limit == 0 || self.default_list_limit > MAX_LIST_LIMIT {
            anyhow::bail!("STUDIO_LIST_LIMIT must be between 1 and {}", MAX_LIST_LIMIT);
        }

        if self.http_timeout_secs == 0 {
            anyhow::bail!("STUDIO_HTTP_TIMEOUT_SECS must be greater than 0");
        }

        for (name, url) in [
            ("CLOUDINARY_API_BASE_URL", &self.api_base_url),
            ("CLOUDINARY_DELIVERY_BASE_URL", &self.delivery_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must be an http(s) URL, got '{}'", name, url);
            }
        }

        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn credentials(&self) -> Result<&CloudinaryCredentials, AppError> {
        self.credentials.as_ref().ok_or_else(|| {
            AppError::NotConfigured("Cloudinary environment variables not set".to_string())
        })
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
