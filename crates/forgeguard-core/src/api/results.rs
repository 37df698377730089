//! Protected result images (heatmaps, masks).

use super::client::{ApiClient, Credentials, RequestOptions, segment};
use super::download::Download;
use super::error::{ApiError, ApiErrorKind, ApiResult};

impl ApiClient {
    /// `GET /api/results/{filename}?token=<token>`.
    ///
    /// Accepts either a bare file name or the result path reported by an
    /// analysis (`/api/results/heatmap_img1.png`); only the last path
    /// component is requested. Result images are served to `<img>`-style
    /// consumers, so the token travels in the query string rather than the
    /// header.
    ///
    /// # Errors
    /// A client error without a request when no usable file name remains,
    /// otherwise a classified [`ApiError`].
    pub async fn fetch_protected_image(&self, filename: &str) -> ApiResult<Download> {
        let name = result_file_name(filename)?;
        let options = RequestOptions::get().credentials(Credentials::QueryToken);
        let response = self
            .request(&format!("/api/results/{}", segment(name)), options)
            .await?;
        Download::from_response(response, name)
    }
}

fn result_file_name(reference: &str) -> ApiResult<&str> {
    let trimmed = reference.trim();
    let name = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or(trimmed)
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." {
        return Err(ApiError::new(
            ApiErrorKind::Client,
            format!("Not a result file name: {reference:?}"),
            None,
        ));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_file_name_takes_last_component() {
        assert_eq!(result_file_name("mask_img1.png").unwrap(), "mask_img1.png");
        assert_eq!(
            result_file_name("/api/results/heatmap_img1.png").unwrap(),
            "heatmap_img1.png"
        );
        assert_eq!(
            result_file_name("http://localhost:5000/api/results/h.png?token=old").unwrap(),
            "h.png"
        );
    }

    #[test]
    fn test_result_file_name_rejects_empty_and_parent() {
        for bad in ["", "   ", "/api/results/", "..", "/api/results/.."] {
            let err = result_file_name(bad).unwrap_err();
            assert_eq!(err.kind, ApiErrorKind::Client, "{bad:?}");
            assert_eq!(err.status_code, None);
        }
    }
}
