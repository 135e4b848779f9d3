use axum::Json;
use serde_json::Value;
use service_core::error::AppError;

use crate::extract::ValidatedJson;
use crate::models::{AnalyzeRequest, AnalyzeResponse};

/// `POST /api/analyze`: log the submission and echo it back under `received`.
#[tracing::instrument(
    skip(request),
    fields(questions = request.questions.len(), answers = request.answers.len())
)]
pub async fn analyze(
    ValidatedJson(request): ValidatedJson<AnalyzeRequest>,
) -> Result<Json<Value>, AppError> {
    tracing::info!(questions = ?request.questions, "Received questions");
    tracing::info!(answers = ?request.answers, "Received answers");

    let body = serde_json::to_value(AnalyzeResponse::echo(request))?;

    Ok(Json(body))
}
