//! # Translation Handler
//!
//! Turns a natural-language question into SQL via the query translator.

use super::{AppError, AppState};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use sqlrag::{PromptError, TranslationRequest, TranslationResult};
use tracing::info;

/// The handler for `POST /generate-sql`.
///
/// Accepts `{"question": ...}` (or the legacy `{"query": ...}`) and returns
/// `{"sql": ..., "explanation": ...}`. Malformed bodies are rejected with 400.
pub async fn generate_sql_handler(
    State(app_state): State<AppState>,
    payload: Result<Json<TranslationRequest>, JsonRejection>,
) -> Result<Json<TranslationResult>, AppError> {
    let Json(request) =
        payload.map_err(|rejection| PromptError::InvalidRequest(rejection.body_text()))?;
    info!("Received translation request: '{}'", request.question);

    let result = app_state.translator.translate(&request).await?;
    Ok(Json(result))
}
