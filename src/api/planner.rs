//! Day planning endpoints backed by the completion provider

use axum::{Json, body::Bytes, extract::State};
use serde_json::{Value, json};
use tracing::instrument;

use super::AppState;
use crate::ProxyError;
use crate::models::{
    AnalysisRequest, AnalysisResponse, AutofillRequest, AutofillResponse, parse_planner_body,
};
use crate::prompt;

/// OPTIONS /api/analyze-day and /api/autofill-day
pub async fn preflight() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /api/analyze-day
#[instrument(skip_all)]
pub async fn analyze_day(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AnalysisResponse>, ProxyError> {
    let request: AnalysisRequest = parse_planner_body(&body)?;
    let prompt = prompt::analysis_prompt(&request);
    let analysis = state.completions.analyze(&prompt).await?;
    Ok(Json(AnalysisResponse { analysis }))
}

/// POST /api/autofill-day
///
/// The model's text is returned as-is; the front-end parses it.
#[instrument(skip_all)]
pub async fn autofill_day(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AutofillResponse>, ProxyError> {
    let request: AutofillRequest = parse_planner_body(&body)?;
    let prompt = prompt::autofill_prompt(&request);
    let result = state.completions.autofill(&prompt).await?;
    Ok(Json(AutofillResponse { result }))
}
