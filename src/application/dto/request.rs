//! Request DTOs
//!
//! Deserialized and validated request bodies for the HTTP API. Field names
//! are camelCase to match the client payloads.

use serde::Deserialize;
use validator::Validate;

use crate::domain::{ChatKind, MediaItem, MessageKind, PresenceStatus, UserId};

/// Create a new chat.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    #[serde(default)]
    pub kind: ChatKind,

    /// Required for public chats
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    /// Initial members besides the creator
    #[serde(default)]
    pub members: Vec<UserId>,
}

/// Add a member to a chat by username.
#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    #[validate(length(min = 1, max = 32))]
    pub username: String,
}

/// Send a message to a chat.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[validate(length(max = 4000))]
    pub content: Option<String>,

    #[serde(default)]
    pub media: Vec<MediaItem>,

    #[serde(default, rename = "type")]
    pub kind: MessageKind,
}

/// React to a message.
#[derive(Debug, Deserialize, Validate)]
pub struct ReactionRequest {
    #[validate(length(min = 1, max = 32))]
    pub emoji: String,
}

/// Update the requester's persisted status.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: PresenceStatus,
}
