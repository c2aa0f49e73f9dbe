#![allow(dead_code)]

pub mod mock_host;

use std::sync::{Arc, Mutex};

use studio_cloudinary::{MediaHost, ProgressCallback};
use studio_db::Database;
use studio_services::{AssetService, StagedFile, StudioSession, UploadOrchestrator};

pub use mock_host::{HostCall, MockMediaHost};

pub const MIB: usize = 1024 * 1024;
pub const THRESHOLD: u64 = 5 * 1024 * 1024;

/// Service wired to an in-memory registry and, when configured, the mock host
pub struct TestStudio {
    pub db: Database,
    pub host: MockMediaHost,
    pub service: Arc<AssetService>,
}

impl TestStudio {
    pub fn orchestrator(&self) -> UploadOrchestrator {
        UploadOrchestrator::new(self.service.clone(), THRESHOLD)
    }

    pub fn session(&self) -> StudioSession {
        StudioSession::new(self.service.clone(), self.orchestrator())
    }
}

async fn database() -> Database {
    let db = Database::in_memory().await.expect("in-memory database");
    db.migrate().await.expect("migrations");
    db
}

pub async fn setup() -> TestStudio {
    let db = database().await;
    let host = MockMediaHost::new();
    let dyn_host: Arc<dyn MediaHost> = Arc::new(host.clone());
    let service = Arc::new(AssetService::new(&db, Some(dyn_host), 50));

    TestStudio { db, host, service }
}

/// Same wiring with the configuration gate closed
pub async fn setup_unconfigured() -> TestStudio {
    let db = database().await;
    let service = Arc::new(AssetService::new(&db, None, 50));

    TestStudio {
        db,
        host: MockMediaHost::new(),
        service,
    }
}

pub fn image(name: &str, size: usize) -> StagedFile {
    StagedFile::new(name, vec![0u8; size])
}

/// Progress callback that records every reported percentage
pub fn progress_recorder() -> (ProgressCallback, Arc<Mutex<Vec<u8>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: ProgressCallback = Arc::new(move |p| sink.lock().unwrap().push(p));
    (callback, seen)
}
