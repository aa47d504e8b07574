//! Message Handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::application::dto::request::{ReactionRequest, SendMessageRequest};
use crate::application::services::MessageService;
use crate::domain::{ChatId, Message, MessageContent, MessageId};
use crate::presentation::http::extractors::CurrentUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,

    #[serde(default)]
    pub skip: i64,
}

/// GET /api/chats/{chat_id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(chat_id): Path<ChatId>,
    Query(params): Query<MessagesQuery>,
) -> Result<Json<Vec<Message>>, AppError> {
    let messages = MessageService::new(state.store, state.hub)
        .list(chat_id, user, params.limit, params.skip)
        .await?;
    Ok(Json(messages))
}

/// POST /api/chats/{chat_id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(chat_id): Path<ChatId>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let content = MessageContent {
        text: request.content,
        media: request.media,
    };

    let message = MessageService::new(state.store, state.hub)
        .send(chat_id, user, content, request.kind)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /api/messages/{message_id}/reactions
pub async fn react(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(message_id): Path<MessageId>,
    Json(request): Json<ReactionRequest>,
) -> Result<Json<Message>, AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let message = MessageService::new(state.store, state.hub)
        .react(message_id, user, request.emoji)
        .await?;

    Ok(Json(message))
}
