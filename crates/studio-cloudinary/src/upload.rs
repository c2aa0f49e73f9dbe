//! Direct multipart upload with progress reporting, and data URI encoding for the
//! inline path.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use reqwest::multipart::{Form, Part};
use studio_core::models::{CloudinaryUploadResponse, UploadCredentials};

use crate::{api::read_json, CloudinaryClient, HostError};

/// Receives upload progress as an integer percentage (0-100).
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

const CHUNK_SIZE: usize = 64 * 1024;

/// `data:{mime};base64,{payload}` with the MIME type guessed from the filename.
pub fn encode_data_uri(data: &[u8], filename: &str) -> String {
    let mime = mime_guess::from_path(filename).first_or_octet_stream();
    format!("data:{};base64,{}", mime.essence_str(), STANDARD.encode(data))
}

fn percent(sent: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

/// Request body that hands the file over in fixed-size chunks and reports progress
/// as each chunk is consumed.
fn progress_body(data: Bytes, progress: Option<ProgressCallback>) -> reqwest::Body {
    let total = data.len();
    let chunks: Vec<Bytes> = (0..total)
        .step_by(CHUNK_SIZE)
        .map(|start| data.slice(start..(start + CHUNK_SIZE).min(total)))
        .collect();

    let mut sent = 0usize;
    let body = stream::iter(chunks).map(move |chunk| {
        sent += chunk.len();
        if let Some(callback) = &progress {
            callback(percent(sent, total));
        }
        Ok::<Bytes, std::io::Error>(chunk)
    });

    reqwest::Body::wrap_stream(body)
}

impl CloudinaryClient {
    /// Send a file straight to the host with previously generated credentials.
    ///
    /// Every credential parameter is posted verbatim next to the file part. The
    /// response must be 2xx with a JSON body.
    #[tracing::instrument(skip(self, data, credentials, progress), fields(file.size = data.len()))]
    pub async fn upload_direct(
        &self,
        data: Bytes,
        filename: &str,
        credentials: &UploadCredentials,
        progress: Option<ProgressCallback>,
    ) -> Result<CloudinaryUploadResponse, HostError> {
        if credentials.upload_url.is_empty() {
            return Err(HostError::InvalidRequest(
                "credentials carry no upload URL".to_string(),
            ));
        }

        let size = data.len() as u64;
        if size == 0 {
            if let Some(callback) = &progress {
                callback(100);
            }
        }

        let mime = mime_guess::from_path(filename).first_or_octet_stream();
        let file_part = Part::stream_with_length(progress_body(data, progress), size)
            .file_name(filename.to_string())
            .mime_str(mime.essence_str())
            .map_err(|e| HostError::InvalidRequest(format!("invalid MIME type: {}", e)))?;

        let mut form = Form::new();
        for (key, value) in &credentials.upload_params {
            form = form.text(key.clone(), value.clone());
        }
        let form = form.part("file", file_part);

        let response = self
            .client()
            .post(&credentials.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(HostError::Transport)?;

        let result: CloudinaryUploadResponse = read_json(response).await?;

        tracing::info!(
            public_id = %result.public_id,
            bytes = ?result.bytes,
            "Direct upload completed"
        );

        Ok(result)
    }
}
