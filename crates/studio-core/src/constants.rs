//! Shared constants

/// Files at or above this size go through the direct (signed credential) path
/// when the upload method is `auto`.
pub const DEFAULT_DIRECT_UPLOAD_THRESHOLD_BYTES: u64 = 5 * 1024 * 1024;

/// Folder used by the inline upload function when the caller gives none.
pub const DEFAULT_UPLOAD_FOLDER: &str = "uploads";

/// Folder used for signed credentials when the caller gives none.
pub const DEFAULT_LARGE_UPLOAD_FOLDER: &str = "large-uploads";

/// Folders used by the editing surface for each upload path.
pub const BASE64_UPLOAD_FOLDER: &str = "base64-uploads";
pub const DIRECT_UPLOAD_FOLDER: &str = "direct-uploads";

/// Tags attached to inline uploads when the caller gives none.
pub const DEFAULT_UPLOAD_TAGS: &[&str] = &["user-content"];

/// Owner recorded on direct uploads started from the editing surface.
pub const DIRECT_UPLOAD_USER_ID: &str = "user-initiated";

pub const DEFAULT_LIST_LIMIT: u32 = 50;
pub const MAX_LIST_LIMIT: u32 = 500;

pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudinary.com";
pub const DEFAULT_DELIVERY_BASE_URL: &str = "https://res.cloudinary.com";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://studio.db?mode=rwc";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Environment variables that make up the configuration gate.
pub const ENV_CLOUD_NAME: &str = "CLOUDINARY_CLOUD_NAME";
pub const ENV_API_KEY: &str = "CLOUDINARY_API_KEY";
pub const ENV_API_SECRET: &str = "CLOUDINARY_API_SECRET";

/// `sha1` (default) or `sha256`.
pub const ENV_SIGNATURE_ALGORITHM: &str = "CLOUDINARY_SIGNATURE_ALGORITHM";
