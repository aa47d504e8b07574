//! User Handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::application::dto::request::UpdateStatusRequest;
use crate::application::dto::response::StatusResponse;
use crate::application::services::UserService;
use crate::domain::{User, UserId};
use crate::presentation::http::extractors::CurrentUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub query: String,

    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// GET /api/users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(_requester): CurrentUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<User>, AppError> {
    let user = UserService::new(state.store, state.hub).get(user_id).await?;
    Ok(Json(user))
}

/// GET /api/users/search?query=...
pub async fn search_users(
    State(state): State<AppState>,
    CurrentUser(requester): CurrentUser,
    Query(params): Query<UserSearchQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = UserService::new(state.store, state.hub)
        .search(&params.query, requester, params.limit)
        .await?;
    Ok(Json(users))
}

/// PUT /api/users/status
pub async fn update_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let updated = UserService::new(state.store, state.hub)
        .update_status(user, request.status)
        .await?;

    Ok(Json(StatusResponse {
        status: updated.status,
        last_seen: updated.last_seen,
    }))
}
