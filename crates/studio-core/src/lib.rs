//! Studio Core Library
//!
//! This crate provides the domain models, error types, configuration, transformation
//! helpers and validation that are shared across all Studio components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod presets;
pub mod transform_url;
pub mod validation;

// Re-export commonly used types
pub use config::{is_configured, CloudinaryCredentials, SignatureAlgorithm, StudioConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use presets::{find_preset, presets_in, PresetCategory, PresetDefinition, PRESETS};
pub use transform_url::TransformUrlBuilder;
