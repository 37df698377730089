//! Image endpoints for the current user.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use reqwest::multipart::{Form, Part};

use super::client::{ApiClient, RequestOptions, segment};
use super::error::{ApiError, ApiResult};
use super::types::{Image, ImageList, MessageReply, UploadReceipt};

/// Multipart field the backend reads the file from.
const UPLOAD_FIELD: &str = "image";

/// An image file read from disk and ready to upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Reads `path` and sniffs its type from the content.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not an image.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or_else(|| "upload".to_string(), str::to_string);
        Self::from_bytes(filename, bytes)
    }

    /// # Errors
    /// Returns an error if `bytes` is not a recognizable image.
    pub fn from_bytes(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let filename = filename.into();
        let Some(kind) = infer::get(&bytes) else {
            bail!("{filename} is not a recognized image file");
        };
        if kind.matcher_type() != infer::MatcherType::Image {
            bail!("{filename} is not an image ({})", kind.mime_type());
        }
        Ok(Self {
            filename,
            mime_type: kind.mime_type().to_string(),
            bytes,
        })
    }

    fn into_form(self) -> ApiResult<Form> {
        let part = Part::bytes(self.bytes)
            .file_name(self.filename)
            .mime_str(&self.mime_type)
            .map_err(|e| ApiError::decode(format!("Invalid MIME type: {e}")))?;
        Ok(Form::new().part(UPLOAD_FIELD, part))
    }
}

impl ApiClient {
    /// `POST /api/images/upload` (multipart).
    ///
    /// # Errors
    /// Returns a classified [`ApiError`].
    pub async fn upload_image(&self, upload: ImageUpload) -> ApiResult<UploadReceipt> {
        let form = upload.into_form()?;
        self.request_json("/api/images/upload", RequestOptions::post().multipart(form))
            .await
    }

    /// `GET /api/images`.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`].
    pub async fn list_images(&self) -> ApiResult<Vec<Image>> {
        let list: ImageList = self.request_json("/api/images", RequestOptions::get()).await?;
        Ok(list.images)
    }

    /// `GET /api/images/{id}`.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`].
    pub async fn get_image(&self, id: &str) -> ApiResult<Image> {
        self.request_json(&format!("/api/images/{}", segment(id)), RequestOptions::get())
            .await
    }

    /// `DELETE /api/images/{id}`.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`].
    pub async fn delete_image(&self, id: &str) -> ApiResult<MessageReply> {
        self.request_or_default(
            &format!("/api/images/{}", segment(id)),
            RequestOptions::delete(),
        )
        .await
    }

    /// `DELETE /api/images`: removes every image of the current user.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`].
    pub async fn delete_all_images(&self) -> ApiResult<MessageReply> {
        self.request_or_default("/api/images", RequestOptions::delete())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_upload_sniffs_png() {
        let upload = ImageUpload::from_bytes("scan.png", PNG_HEADER.to_vec()).unwrap();
        assert_eq!(upload.mime_type, "image/png");
        assert_eq!(upload.filename, "scan.png");
    }

    #[test]
    fn test_upload_rejects_non_image() {
        let err = ImageUpload::from_bytes("notes.txt", b"just some text".to_vec()).unwrap_err();
        assert!(err.to_string().contains("not a recognized image"));

        let pdf = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3".to_vec();
        let err = ImageUpload::from_bytes("doc.pdf", pdf).unwrap_err();
        assert!(err.to_string().contains("not an image"));
    }

    #[test]
    fn test_upload_from_path_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evidence.png");
        fs::write(&path, PNG_HEADER).unwrap();

        let upload = ImageUpload::from_path(&path).unwrap();
        assert_eq!(upload.filename, "evidence.png");
        assert_eq!(upload.bytes, PNG_HEADER);
    }
}
