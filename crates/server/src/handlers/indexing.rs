//! # Indexing Handler
//!
//! Triggers a schema indexing run over HTTP, for schedulers that prefer a webhook
//! to the `sqlrag-indexer` CLI.

use super::{AppError, AppState};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Serialize, Deserialize, Debug)]
pub struct IndexResponse {
    pub message: String,
    pub tables_processed: usize,
}

/// The handler for `POST /index`.
pub async fn index_handler(
    State(app_state): State<AppState>,
) -> Result<Json<IndexResponse>, AppError> {
    info!("Received request to re-index the database schema.");
    let report = app_state
        .indexer
        .reindex_with(&app_state.sqlite_provider)
        .await?;

    Ok(Json(IndexResponse {
        message: format!("Successfully indexed {} tables", report.tables_processed),
        tables_processed: report.tables_processed,
    }))
}
