//! Asset metadata validation
//!
//! Metadata attached through an asset update must be a JSON object with a bounded
//! number of keys. Keys follow `^[a-zA-Z0-9_\-\.:]+$`; each value is limited by its
//! serialized length.

use anyhow::{Context, Result};
use regex::Regex;

pub const MAX_METADATA_KEY_LENGTH: usize = 64;

/// Serialized JSON length per value
pub const MAX_METADATA_VALUE_LENGTH: usize = 1024;

pub const MAX_METADATA_KEYS: usize = 50;

pub fn validate_metadata_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(anyhow::anyhow!("Metadata key cannot be empty"));
    }

    if key.len() > MAX_METADATA_KEY_LENGTH {
        return Err(anyhow::anyhow!(
            "Metadata key '{}' exceeds maximum length of {} characters",
            key,
            MAX_METADATA_KEY_LENGTH
        ));
    }

    let pattern = Regex::new(r"^[a-zA-Z0-9_\-\.:]+$")
        .context("Failed to compile metadata key validation regex")?;

    if !pattern.is_match(key) {
        return Err(anyhow::anyhow!(
            "Metadata key '{}' contains invalid characters. Allowed: letters, digits, underscore, hyphen, dot, colon",
            key
        ));
    }

    Ok(())
}

pub fn validate_metadata(metadata: &serde_json::Value) -> Result<()> {
    let obj = metadata
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("Metadata must be a JSON object"))?;

    if obj.len() > MAX_METADATA_KEYS {
        return Err(anyhow::anyhow!(
            "Metadata contains {} keys, but maximum allowed is {}",
            obj.len(),
            MAX_METADATA_KEYS
        ));
    }

    for (key, value) in obj {
        validate_metadata_key(key).with_context(|| format!("Invalid metadata key: '{}'", key))?;

        let serialized =
            serde_json::to_string(value).context("Failed to serialize metadata value")?;
        if serialized.len() > MAX_METADATA_VALUE_LENGTH {
            return Err(anyhow::anyhow!(
                "Metadata value for '{}' exceeds maximum length of {} characters when serialized",
                key,
                MAX_METADATA_VALUE_LENGTH
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_key() {
        assert!(validate_metadata_key("camera").is_ok());
        assert!(validate_metadata_key("exif:iso").is_ok());
        assert!(validate_metadata_key("").is_err());
        assert!(validate_metadata_key("white space").is_err());
        assert!(validate_metadata_key(&"k".repeat(65)).is_err());
    }

    #[test]
    fn test_metadata_must_be_object() {
        assert!(validate_metadata(&json!({"camera": "x100", "rating": 5})).is_ok());
        assert!(validate_metadata(&json!(["camera"])).is_err());
        assert!(validate_metadata(&json!("camera")).is_err());
    }

    #[test]
    fn test_metadata_value_length() {
        let long = "x".repeat(MAX_METADATA_VALUE_LENGTH);
        assert!(validate_metadata(&json!({ "note": long })).is_err());
    }

    #[test]
    fn test_metadata_key_count() {
        let obj: serde_json::Map<String, serde_json::Value> = (0..=MAX_METADATA_KEYS)
            .map(|i| (format!("k{}", i), json!(i)))
            .collect();
        assert!(validate_metadata(&serde_json::Value::Object(obj)).is_err());
    }
}
