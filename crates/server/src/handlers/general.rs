//! # General Route Handlers
//!
//! The root banner and the liveness probe.

use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

/// The handler for the root (`/`) endpoint.
pub async fn root() -> &'static str {
    "sqlrag server is running."
}

/// The handler for the health check (`/health`) endpoint. It checks no dependencies.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}
