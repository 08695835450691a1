//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let database = state.store.health_check().await.unwrap_or(false);
    let coordination = state.coordination.health_check().await.unwrap_or(false);

    let (status, label) = if database && coordination {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(ApiResponse::ok(HealthResponse {
            status: label.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database,
            coordination,
        })),
    )
}
