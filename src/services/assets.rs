//! Asset store client for uploaded images.
//!
//! SYSTEM CONTEXT
//! ==============
//! Images live in a storage bucket behind a Supabase-compatible REST API. A
//! content record keeps only the public URL returned here; the bucket owns
//! the bytes. Object names are `images/<unix millis>.<ext>`, which is enough
//! to avoid collisions for a single operator.

use std::path::Path;
use std::time::Duration;

use crate::config::StorageConfig;
use crate::error::ErrorCode;

const OBJECT_PREFIX: &str = "images";
const FALLBACK_EXTENSION: &str = "bin";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("image storage is not configured")]
    NotConfigured,
    #[error("upload is empty")]
    EmptyUpload,
    #[error("upload request failed: {0}")]
    Request(String),
    #[error("upload rejected: status {status}")]
    Response { status: u16, body: String },
    #[error("storage client build failed: {0}")]
    ClientBuild(String),
}

impl ErrorCode for AssetError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "E_ASSET_NOT_CONFIGURED",
            Self::EmptyUpload => "E_ASSET_EMPTY",
            Self::Request(_) | Self::Response { .. } | Self::ClientBuild(_) => "E_ASSET_UPLOAD",
        }
    }

    fn status(&self) -> axum::http::StatusCode {
        match self {
            Self::NotConfigured => axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Self::EmptyUpload => axum::http::StatusCode::BAD_REQUEST,
            Self::Request(_) | Self::Response { .. } => axum::http::StatusCode::BAD_GATEWAY,
            Self::ClientBuild(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Response { status: 429 | 500..=599, .. })
    }
}

/// An image as received from the operator.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Accepts image bytes and returns a durable public URL.
#[async_trait::async_trait]
pub trait AssetStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`AssetError`] if the upload is empty or the transfer fails.
    async fn upload(&self, upload: ImageUpload) -> Result<String, AssetError>;
}

/// Object path for an upload made at `unix_millis`.
#[must_use]
pub fn object_path(file_name: &str, unix_millis: i128) -> String {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map_or_else(|| FALLBACK_EXTENSION.to_owned(), str::to_ascii_lowercase);
    format!("{OBJECT_PREFIX}/{unix_millis}.{ext}")
}

// =============================================================================
// STORAGE BUCKET
// =============================================================================

pub struct StorageBucket {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl StorageBucket {
    /// # Errors
    ///
    /// Returns `ClientBuild` if the HTTP client cannot be constructed.
    pub fn new(config: &StorageConfig) -> Result<Self, AssetError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AssetError::ClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            service_key: config.service_key.clone(),
            bucket: config.bucket.clone(),
        })
    }

    #[must_use]
    pub fn upload_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{path}", self.base_url, self.bucket)
    }

    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{path}", self.base_url, self.bucket)
    }
}

#[async_trait::async_trait]
impl AssetStore for StorageBucket {
    async fn upload(&self, upload: ImageUpload) -> Result<String, AssetError> {
        if upload.bytes.is_empty() {
            return Err(AssetError::EmptyUpload);
        }

        let path = object_path(&upload.file_name, unix_millis_now());
        let content_type = upload.content_type.unwrap_or_else(|| "application/octet-stream".into());
        let size = upload.bytes.len();

        let response = self
            .http
            .post(self.upload_url(&path))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(upload.bytes)
            .send()
            .await
            .map_err(|e| AssetError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %path, "image upload rejected");
            return Err(AssetError::Response { status: status.as_u16(), body });
        }

        tracing::info!(%path, size, "image uploaded");
        Ok(self.public_url(&path))
    }
}

fn unix_millis_now() -> i128 {
    time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}

// =============================================================================
// DISABLED
// =============================================================================

/// Stand-in used when no storage is configured.
pub struct DisabledAssetStore;

#[async_trait::async_trait]
impl AssetStore for DisabledAssetStore {
    async fn upload(&self, _upload: ImageUpload) -> Result<String, AssetError> {
        Err(AssetError::NotConfigured)
    }
}

#[cfg(test)]
#[path = "assets_test.rs"]
mod tests;
