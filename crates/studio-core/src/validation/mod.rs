//! Validation modules

pub mod asset;
pub mod metadata;

pub use asset::{validate_folder, validate_public_id, validate_tags, MAX_TAGS, MAX_TAG_LENGTH};
pub use metadata::{
    validate_metadata, validate_metadata_key, MAX_METADATA_KEYS, MAX_METADATA_KEY_LENGTH,
    MAX_METADATA_VALUE_LENGTH,
};
