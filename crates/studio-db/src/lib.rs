//! SQLite-backed registry for assets and pending uploads.

pub mod db;

pub use db::{AssetRepository, Database, PendingUploadRepository};
