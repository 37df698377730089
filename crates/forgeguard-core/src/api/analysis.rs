//! Two-phase analysis endpoints.

use super::client::{ApiClient, RequestOptions, segment};
use super::error::ApiResult;
use super::types::AnalysisResult;

impl ApiClient {
    /// `POST /api/analyze/phase1/{imageId}`: error-level analysis.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](super::ApiError).
    pub async fn run_phase1(&self, image_id: &str) -> ApiResult<AnalysisResult> {
        self.request_json(
            &format!("/api/analyze/phase1/{}", segment(image_id)),
            RequestOptions::post(),
        )
        .await
    }

    /// `POST /api/analyze/phase2/{imageId}`: deep-model classification.
    ///
    /// The backend rejects this until phase 1 is complete; use
    /// [`AnalysisPipeline`](crate::pipeline::AnalysisPipeline) to gate it locally.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](super::ApiError).
    pub async fn run_phase2(&self, image_id: &str) -> ApiResult<AnalysisResult> {
        self.request_json(
            &format!("/api/analyze/phase2/{}", segment(image_id)),
            RequestOptions::post(),
        )
        .await
    }

    /// `GET /api/analysis/{imageId}`.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](super::ApiError); 404 when the image
    /// has not been analyzed yet.
    pub async fn get_analysis(&self, image_id: &str) -> ApiResult<AnalysisResult> {
        self.request_json(
            &format!("/api/analysis/{}", segment(image_id)),
            RequestOptions::get(),
        )
        .await
    }
}
