//! Analysis command handlers.

use anyhow::Result;
use forgeguard_core::api::AnalysisResult;
use forgeguard_core::pipeline::{AnalysisPipeline, Phase, PipelineError};

use super::print_json;
use crate::cli::app::App;
use crate::cli::render;

/// Unwraps backend failures so they render like any other API error.
fn into_anyhow(err: PipelineError) -> anyhow::Error {
    match err {
        PipelineError::Api(api) => api.into(),
        other => other.into(),
    }
}

fn report(result: &AnalysisResult, json: bool) -> Result<()> {
    if json {
        return print_json(result);
    }
    print!("{}", render::analysis_detail(result));
    Ok(())
}

fn announce(phase: Phase, image_id: &str, json: bool) {
    if !json {
        println!("Running {phase} on {image_id}...");
    }
}

pub async fn phase1(app: &App, id: &str, json: bool) -> Result<()> {
    let mut pipeline = AnalysisPipeline::new(app.client().clone(), id);
    announce(Phase::One, id, json);
    let result = pipeline.run_phase1().await.map_err(into_anyhow)?;
    report(result, json)
}

pub async fn phase2(app: &App, id: &str, json: bool) -> Result<()> {
    let mut pipeline = AnalysisPipeline::load(app.client().clone(), id)
        .await
        .map_err(into_anyhow)?;
    announce(Phase::Two, id, json);
    let result = pipeline.run_phase2().await.map_err(into_anyhow)?;
    report(result, json)
}

pub async fn run_all(app: &App, id: &str, json: bool) -> Result<()> {
    let mut pipeline = AnalysisPipeline::new(app.client().clone(), id);
    announce(Phase::One, id, json);
    pipeline.run_phase1().await.map_err(into_anyhow)?;
    announce(Phase::Two, id, json);
    let result = pipeline.run_phase2().await.map_err(into_anyhow)?;
    report(result, json)
}

pub async fn show(app: &App, id: &str, json: bool) -> Result<()> {
    let pipeline = AnalysisPipeline::load(app.client().clone(), id)
        .await
        .map_err(into_anyhow)?;
    match pipeline.result() {
        Some(result) => report(result, json),
        None if json => print_json(&serde_json::Value::Null),
        None => {
            println!("No analysis yet for {id}. Start with `forgeguard analyze phase1 {id}`.");
            Ok(())
        }
    }
}
