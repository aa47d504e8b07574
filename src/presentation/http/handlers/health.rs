//! Health Check Handler

use axum::extract::State;
use axum::Json;

use crate::application::dto::response::HealthResponse;
use crate::startup::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        connections: state.hub.connection_count(),
        online_users: state.hub.online_user_count(),
    })
}
