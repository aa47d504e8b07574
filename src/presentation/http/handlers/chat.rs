//! Chat Handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::application::dto::request::{AddMemberRequest, CreateChatRequest};
use crate::application::dto::response::MemberAddedResponse;
use crate::application::services::ChatService;
use crate::domain::{Chat, ChatId};
use crate::presentation::http::extractors::CurrentUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct ChatSearchQuery {
    pub query: String,

    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// GET /api/chats
pub async fn list_chats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Chat>>, AppError> {
    let chats = ChatService::new(state.store).list_for_user(user).await?;
    Ok(Json(chats))
}

/// GET /api/chats/search?query=...
pub async fn search_chats(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(params): Query<ChatSearchQuery>,
) -> Result<Json<Vec<Chat>>, AppError> {
    let chats = ChatService::new(state.store)
        .search_public(&params.query, params.limit)
        .await?;
    Ok(Json(chats))
}

/// POST /api/chats
pub async fn create_chat(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateChatRequest>,
) -> Result<(StatusCode, Json<Chat>), AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let chat = ChatService::new(state.store)
        .create(user, request.kind, request.name, request.members)
        .await?;

    Ok((StatusCode::CREATED, Json(chat)))
}

/// POST /api/chats/{chat_id}/members
pub async fn add_member(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(chat_id): Path<ChatId>,
    Json(request): Json<AddMemberRequest>,
) -> Result<Json<MemberAddedResponse>, AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    ChatService::new(state.store)
        .add_member(chat_id, user, &request.username)
        .await?;

    Ok(Json(MemberAddedResponse {
        message: "Member added",
    }))
}
