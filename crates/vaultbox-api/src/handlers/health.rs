//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let storage_healthy = match state.objects.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!(error = %e, "Object store health probe failed");
            false
        }
    };

    Json(ApiResponse::ok(HealthResponse {
        status: if storage_healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage_provider: state.objects.provider_type().to_string(),
        storage_healthy,
    }))
}
