//! Two-phase analysis of one image.
//!
//! Phase 1 (error-level analysis) produces a heatmap; phase 2 (the deep
//! classifier) produces the mask and the verdict. Phase 2 is only offered
//! once the backend reports phase 1 complete for the same image, and
//! [`AnalysisPipeline::run_phase2`] refuses locally without a request
//! otherwise.

use std::fmt;

use crate::api::{ApiClient, ApiError, ApiErrorKind, AnalysisResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Error-level analysis
    One,
    /// Deep-learning classification
    Two,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::One => write!(f, "phase 1 (error level analysis)"),
            Phase::Two => write!(f, "phase 2 (deep learning classification)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Phase 2 requested before phase 1 completed
    Phase1Incomplete { image_id: String },
    Api(ApiError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Phase1Incomplete { image_id } => write!(
                f,
                "Phase 1 has not completed for image {image_id}; run phase 1 first"
            ),
            PipelineError::Api(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<ApiError> for PipelineError {
    fn from(err: ApiError) -> Self {
        PipelineError::Api(err)
    }
}

/// Whether phase 2 may be triggered given the latest known result.
pub fn phase2_available(result: Option<&AnalysisResult>) -> bool {
    result.is_some_and(|r| r.phase1_complete)
}

/// Analysis state of a single image plus the calls that advance it.
pub struct AnalysisPipeline {
    client: ApiClient,
    image_id: String,
    result: Option<AnalysisResult>,
}

impl AnalysisPipeline {
    /// A pipeline with no known analysis.
    pub fn new(client: ApiClient, image_id: impl Into<String>) -> Self {
        Self {
            client,
            image_id: image_id.into(),
            result: None,
        }
    }

    /// Seeds the pipeline from the backend. A 404 means the image has not
    /// been analyzed yet.
    ///
    /// # Errors
    /// Returns any other API error.
    pub async fn load(client: ApiClient, image_id: impl Into<String>) -> Result<Self, PipelineError> {
        let mut pipeline = Self::new(client, image_id);
        match pipeline.client.get_analysis(&pipeline.image_id).await {
            Ok(result) => pipeline.result = Some(result),
            Err(err) if err.kind == ApiErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        Ok(pipeline)
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<AnalysisResult> {
        self.result
    }

    pub fn can_run_phase2(&self) -> bool {
        phase2_available(self.result.as_ref())
    }

    /// # Errors
    /// Returns the API error; the previous result is kept.
    pub async fn run_phase1(&mut self) -> Result<&AnalysisResult, PipelineError> {
        tracing::info!(image_id = %self.image_id, "running phase 1");
        let result = self.client.run_phase1(&self.image_id).await?;
        Ok(self.result.insert(result))
    }

    /// # Errors
    /// [`PipelineError::Phase1Incomplete`] without contacting the backend
    /// when phase 1 has not completed, otherwise the API error.
    pub async fn run_phase2(&mut self) -> Result<&AnalysisResult, PipelineError> {
        if !self.can_run_phase2() {
            return Err(PipelineError::Phase1Incomplete {
                image_id: self.image_id.clone(),
            });
        }
        tracing::info!(image_id = %self.image_id, "running phase 2");
        let result = self.client.run_phase2(&self.image_id).await?;
        Ok(self.result.insert(result))
    }

    /// Runs phase 1, then phase 2 if phase 1 reported completion.
    ///
    /// # Errors
    /// As [`AnalysisPipeline::run_phase1`] and [`AnalysisPipeline::run_phase2`].
    pub async fn run_all(&mut self) -> Result<&AnalysisResult, PipelineError> {
        self.run_phase1().await?;
        self.run_phase2().await
    }
}
