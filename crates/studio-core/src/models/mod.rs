//! Data models for the studio
//!
//! This module contains the data structures shared by the host client, the registry and
//! the service layer, organized by domain.

mod asset;
mod pending_upload;
mod transformation;
mod upload;

// Re-export all models for convenient imports
pub use asset::*;
pub use pending_upload::*;
pub use transformation::*;
pub use upload::*;
