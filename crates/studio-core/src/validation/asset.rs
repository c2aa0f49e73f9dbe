//! Public ID, folder and tag validation
//!
//! Public IDs and folders are slash-separated paths on the image host. Segments may
//! hold letters, digits, underscore, hyphen, dot and space; empty segments and `..`
//! are rejected.

use anyhow::{Context, Result};
use regex::Regex;

/// Maximum length for a public ID or folder path
pub const MAX_PATH_LENGTH: usize = 255;

/// Maximum number of tags on one asset
pub const MAX_TAGS: usize = 40;

/// Maximum length of a single tag
pub const MAX_TAG_LENGTH: usize = 64;

fn validate_path(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(anyhow::anyhow!("{} cannot be empty", kind));
    }

    if value.len() > MAX_PATH_LENGTH {
        return Err(anyhow::anyhow!(
            "{} '{}' exceeds maximum length of {} characters",
            kind,
            value,
            MAX_PATH_LENGTH
        ));
    }

    let segment = Regex::new(r"^[a-zA-Z0-9_\-\. ]+$")
        .context("Failed to compile path segment validation regex")?;

    for part in value.split('/') {
        if part.is_empty() || part == "." || part == ".." || !segment.is_match(part) {
            return Err(anyhow::anyhow!(
                "{} '{}' contains an invalid segment '{}'",
                kind,
                value,
                part
            ));
        }
    }

    Ok(())
}

pub fn validate_public_id(public_id: &str) -> Result<()> {
    validate_path("Public ID", public_id)
}

pub fn validate_folder(folder: &str) -> Result<()> {
    validate_path("Folder", folder)
}

/// Tags are sent comma-joined to the host, so commas are not allowed inside a tag.
pub fn validate_tags(tags: &[String]) -> Result<()> {
    if tags.len() > MAX_TAGS {
        return Err(anyhow::anyhow!(
            "{} tags given, but maximum allowed is {}",
            tags.len(),
            MAX_TAGS
        ));
    }

    for tag in tags {
        if tag.trim().is_empty() {
            return Err(anyhow::anyhow!("Tags cannot be empty"));
        }
        if tag.len() > MAX_TAG_LENGTH {
            return Err(anyhow::anyhow!(
                "Tag '{}' exceeds maximum length of {} characters",
                tag,
                MAX_TAG_LENGTH
            ));
        }
        if tag.contains(',') {
            return Err(anyhow::anyhow!("Tag '{}' cannot contain a comma", tag));
        }
    }

    Ok(())
}
