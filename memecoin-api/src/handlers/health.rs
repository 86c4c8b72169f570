//! Health Handler

use axum::Json;
use serde::Serialize;

/// Health probe body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

/// `GET /health`
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        name: "memecoin-api",
        version: crate::VERSION,
    })
}
