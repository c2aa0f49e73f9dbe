//! Studio services
//!
//! The backend function surface ([`AssetService`]), the upload orchestrator that picks
//! and sequences the inline or direct upload path ([`UploadOrchestrator`]), and the
//! UI-independent editing session ([`StudioSession`]).

pub mod assets;
pub mod orchestrator;
pub mod session;

pub use assets::AssetService;
pub use orchestrator::{StagedFile, UploadOrchestrator, UploadOutcome};
pub use session::{PreviewRequest, StudioSession};
pub use studio_cloudinary::ProgressCallback;
