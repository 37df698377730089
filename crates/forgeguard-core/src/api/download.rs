//! Binary responses (zip archives, result images) streamed to disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::Response;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::client::ApiResponse;
use super::error::{ApiError, ApiResult};

/// A successful non-JSON response whose body has not been read yet.
#[derive(Debug)]
pub struct Download {
    response: Response,
    suggested_name: String,
}

impl Download {
    pub(crate) fn from_response(response: ApiResponse, suggested_name: impl Into<String>) -> ApiResult<Self> {
        match response {
            ApiResponse::Raw(response) => Ok(Self {
                response,
                suggested_name: suggested_name.into(),
            }),
            ApiResponse::Json(_) => Err(ApiError::decode("Expected a file, got a JSON response")),
        }
    }

    /// File name the body should be saved under.
    pub fn suggested_name(&self) -> &str {
        &self.suggested_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Reads the whole body into memory.
    ///
    /// # Errors
    /// Returns a network error if the body is interrupted.
    pub async fn into_bytes(self) -> ApiResult<Bytes> {
        self.response.bytes().await.map_err(|err| {
            tracing::warn!(error = %err, "download interrupted");
            ApiError::network()
        })
    }

    /// Streams the body into `dir/<suggested name>`, returning the path.
    ///
    /// A partially written file is removed when the stream fails.
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be written or the
    /// body is interrupted.
    pub async fn save_to(self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        let path = dir.join(&self.suggested_name);

        let written = write_stream(self.response, &path).await;
        match written {
            Ok(bytes) => {
                tracing::info!(path = %path.display(), bytes, "download saved");
                Ok(path)
            }
            Err(err) => {
                let _ = tokio::fs::remove_file(&path).await;
                Err(err)
            }
        }
    }
}

async fn write_stream(response: Response, path: &Path) -> Result<u64> {
    let mut file = File::create(path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut stream = response.bytes_stream();
    let mut total = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| {
            tracing::warn!(error = %err, "download interrupted");
            ApiError::network()
        })?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        total += chunk.len() as u64;
    }
    file.flush()
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(total)
}
