use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use studio_cloudinary::{HostError, HostResult, MediaHost, ProgressCallback};
use studio_core::models::{
    CloudinaryUploadResponse, Transformation, UploadCredentials, UploadOptions,
};
use studio_core::TransformUrlBuilder;

/// Calls observed by the mock host
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Upload { folder: Option<String> },
    Credentials { folder: Option<String> },
    UploadDirect { filename: String, size: usize },
    Destroy { public_id: String },
}

#[derive(Default)]
struct MockState {
    calls: Vec<HostCall>,
    fail_upload: bool,
    fail_credentials: bool,
    fail_upload_direct: bool,
    fail_destroy: bool,
}

/// In-process image host. Every upload succeeds unless told otherwise.
#[derive(Clone)]
pub struct MockMediaHost {
    state: Arc<Mutex<MockState>>,
    urls: TransformUrlBuilder,
}

impl MockMediaHost {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            urls: TransformUrlBuilder::new("https://res.cloudinary.com", "demo"),
        }
    }

    pub fn fail_upload(&self) {
        self.state.lock().unwrap().fail_upload = true;
    }

    pub fn fail_credentials(&self) {
        self.state.lock().unwrap().fail_credentials = true;
    }

    pub fn fail_upload_direct(&self) {
        self.state.lock().unwrap().fail_upload_direct = true;
    }

    pub fn fail_destroy(&self) {
        self.state.lock().unwrap().fail_destroy = true;
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn direct_uploads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, HostCall::UploadDirect { .. }))
            .count()
    }

    pub fn inline_uploads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, HostCall::Upload { .. }))
            .count()
    }

    fn record(&self, call: HostCall) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn response(&self, folder: Option<&str>, filename: &str, bytes: u64) -> CloudinaryUploadResponse {
        let stem = filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(filename);
        let format = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or("png");
        let public_id = match folder {
            Some(folder) => format!("{}/{}", folder, stem),
            None => stem.to_string(),
        };
        let secure_url = self.urls.secure_url(&public_id);

        CloudinaryUploadResponse {
            url: secure_url.replacen("https://", "http://", 1),
            secure_url,
            public_id,
            format: format.to_string(),
            width: Some(800),
            height: Some(600),
            bytes: Some(bytes),
            asset_id: None,
            version: Some(1),
            version_id: None,
            signature: None,
            resource_type: Some("image".to_string()),
            created_at: None,
            tags: None,
            etag: None,
            placeholder: None,
            delivery_type: Some("upload".to_string()),
            access_mode: None,
            existing: None,
            folder: folder.map(str::to_string),
            original_filename: Some(stem.to_string()),
        }
    }
}

fn server_error() -> HostError {
    HostError::Status {
        status: 500,
        reason: "Internal Server Error".to_string(),
        message: Some("mock host failure".to_string()),
    }
}

#[async_trait]
impl MediaHost for MockMediaHost {
    async fn upload(
        &self,
        data_uri: &str,
        options: &UploadOptions,
    ) -> HostResult<CloudinaryUploadResponse> {
        self.record(HostCall::Upload {
            folder: options.folder.clone(),
        });
        if self.state.lock().unwrap().fail_upload {
            return Err(server_error());
        }

        let filename = options.filename.as_deref().unwrap_or("image.png");
        Ok(self.response(options.folder.as_deref(), filename, data_uri.len() as u64))
    }

    fn generate_upload_credentials(
        &self,
        options: &UploadOptions,
    ) -> HostResult<UploadCredentials> {
        self.record(HostCall::Credentials {
            folder: options.folder.clone(),
        });
        if self.state.lock().unwrap().fail_credentials {
            return Err(HostError::InvalidRequest("signing is unavailable".to_string()));
        }

        let mut upload_params = BTreeMap::new();
        if let Some(folder) = &options.folder {
            upload_params.insert("folder".to_string(), folder.clone());
        }
        upload_params.insert("api_key".to_string(), "key".to_string());
        upload_params.insert("timestamp".to_string(), "1700000000".to_string());
        upload_params.insert("signature".to_string(), "mock".to_string());

        Ok(UploadCredentials {
            upload_url: "https://api.cloudinary.com/v1_1/demo/image/upload".to_string(),
            upload_params,
        })
    }

    async fn upload_direct(
        &self,
        data: Bytes,
        filename: &str,
        credentials: &UploadCredentials,
        progress: Option<ProgressCallback>,
    ) -> HostResult<CloudinaryUploadResponse> {
        self.record(HostCall::UploadDirect {
            filename: filename.to_string(),
            size: data.len(),
        });
        if self.state.lock().unwrap().fail_upload_direct {
            return Err(server_error());
        }

        if let Some(progress) = progress {
            progress(50);
            progress(100);
        }

        let folder = credentials.upload_params.get("folder").map(String::as_str);
        Ok(self.response(folder, filename, data.len() as u64))
    }

    async fn destroy(&self, public_id: &str) -> HostResult<()> {
        self.record(HostCall::Destroy {
            public_id: public_id.to_string(),
        });
        if self.state.lock().unwrap().fail_destroy {
            return Err(server_error());
        }
        Ok(())
    }

    fn secure_url(&self, public_id: &str) -> String {
        self.urls.secure_url(public_id)
    }

    fn transformed_url(&self, public_id: &str, transformation: &Transformation) -> String {
        self.urls.build(public_id, transformation)
    }
}
