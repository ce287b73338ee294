//! # Health Handler
//!
//! Liveness endpoint polled by load balancers. Always answers 200; a broken
//! database connection is reported in the body rather than the status code.

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db;
use crate::server::AppState;

/// Health check response payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Overall service status
    #[schema(example = "healthy")]
    pub status: String,
    /// Database connectivity status
    #[schema(example = "connected")]
    pub database: String,
    /// Service version
    #[schema(example = "0.1.0")]
    pub version: String,
}

/// Check service health including database connectivity
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health report", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, database) = match db::health_check(&state.db).await {
        Ok(()) => ("healthy", "connected"),
        Err(err) => {
            tracing::warn!(error = ?err, "Health check failed to reach database");
            ("degraded", "disconnected")
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        database: database.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
