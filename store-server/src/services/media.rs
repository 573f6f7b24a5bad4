//! Media storage service
//!
//! Stores product images either on the local filesystem or on a remote
//! media host, depending on configuration. Files are content-addressed
//! by SHA256 so re-uploading the same bytes is idempotent.

use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::utils::{AppError, AppResult};

/// Media storage configuration
///
/// With an empty `base_url` uploads land on the local filesystem under
/// `local_dir` and are served from `/media/`.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Remote media host endpoint, empty for local storage
    pub base_url: String,
    /// API key for the remote media host
    pub api_key: String,
    /// Local storage directory
    pub local_dir: String,
}

impl MediaConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("MEDIA_BASE_URL").unwrap_or_default(),
            api_key: std::env::var("MEDIA_API_KEY").unwrap_or_default(),
            local_dir: std::env::var("MEDIA_DIR")
                .unwrap_or_else(|_| "/var/lib/reef/store/media".into()),
        }
    }

    pub fn is_remote(&self) -> bool {
        !self.base_url.is_empty()
    }
}

/// Media storage collaborator
pub struct MediaService {
    config: MediaConfig,
    client: reqwest::Client,
}

#[derive(serde::Deserialize)]
struct RemoteUploadResponse {
    url: String,
}

impl MediaService {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Store an uploaded file, returning its public URL
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> AppResult<String> {
        if bytes.is_empty() {
            return Err(AppError::Validation("uploaded file is empty".into()));
        }

        let extension = PathBuf::from(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string());
        let mime = mime_guess::from_path(filename).first_or_octet_stream();
        if !mime.type_().as_str().eq("image") {
            return Err(AppError::Validation(format!(
                "unsupported media type {mime}, only images are accepted"
            )));
        }

        let hash = hex::encode(Sha256::digest(&bytes));
        let stored_name = format!("{hash}.{extension}");

        if self.config.is_remote() {
            self.upload_remote(&stored_name, mime.as_ref(), bytes).await
        } else {
            self.upload_local(&stored_name, bytes).await
        }
    }

    /// Remove a previously stored file; missing files are not an error
    pub async fn delete(&self, url: &str) -> AppResult<()> {
        if self.config.is_remote() {
            let response = self
                .client
                .delete(format!("{}/media", self.config.base_url))
                .bearer_auth(&self.config.api_key)
                .query(&[("url", url)])
                .send()
                .await
                .map_err(|e| AppError::Internal(format!("Media host unreachable: {e}")))?;
            if !response.status().is_success() && response.status() != http::StatusCode::NOT_FOUND {
                return Err(AppError::Internal(format!(
                    "Media host delete failed with status {}",
                    response.status()
                )));
            }
            return Ok(());
        }

        let Some(name) = url.strip_prefix("/media/") else {
            return Err(AppError::Validation(format!("not a media URL: {url}")));
        };
        let path = PathBuf::from(&self.config.local_dir).join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!("Failed to delete media file: {e}"))),
        }
    }

    async fn upload_remote(
        &self,
        stored_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> AppResult<String> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(stored_name.to_string())
            .mime_str(content_type)
            .map_err(|e| AppError::Internal(format!("Invalid media content type: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/media", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Media host unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "Media host upload failed with status {}",
                response.status()
            )));
        }

        let body: RemoteUploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Malformed media host response: {e}")))?;
        Ok(body.url)
    }

    /// Atomic local write: tmp file then rename, so a crash never
    /// leaves a half-written file at the final path
    async fn upload_local(&self, stored_name: &str, bytes: Vec<u8>) -> AppResult<String> {
        let dir = PathBuf::from(&self.config.local_dir);
        let final_path = dir.join(stored_name);
        let url = format!("/media/{stored_name}");

        if tokio::fs::try_exists(&final_path).await.unwrap_or(false) {
            tracing::debug!(name = %stored_name, "Media file already stored, skipping write");
            return Ok(url);
        }

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create media directory: {e}")))?;

        let tmp_path = dir.join(format!("{stored_name}.tmp"));
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write media file: {e}")))?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &final_path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(AppError::Internal(format!("Failed to store media file: {e}")));
        }

        tracing::info!(name = %stored_name, size = bytes.len(), "Media file stored");
        Ok(url)
    }

    /// Directory used when serving local media
    pub fn local_dir(&self) -> &str {
        &self.config.local_dir
    }

    /// Whether uploads go to a remote media host
    pub fn is_remote(&self) -> bool {
        self.config.is_remote()
    }
}
