//! Landing page and health check
//!
//! # Endpoints
//!
//! ```text
//! GET /         -> <h1>Task Management App</h1>
//! GET /health   -> {"status": "healthy", "version": "0.1.0", "database": "connected"}
//! ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, response::Html, Json};
use serde::{Deserialize, Serialize};
use taskhub_shared::db::pool::health_check as database_health_check;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    /// Application version
    pub version: String,

    /// `connected` or `disconnected`
    pub database: String,
}

pub async fn index() -> Html<&'static str> {
    Html("<h1>Task Management App</h1>")
}

/// Returns service health status including database connectivity
///
/// Always 200; a failed database round-trip reports `degraded`.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database_status = match database_health_check(&state.db).await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "disconnected"
        }
    };

    Ok(Json(HealthResponse {
        status: if database_status == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database_status.to_string(),
    }))
}
