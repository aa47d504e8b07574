//! Chat Service
//!
//! Chat listing, discovery, creation, and membership management.

use std::sync::Arc;

use crate::domain::{Chat, ChatKind, ChatStore, UserId};
use crate::shared::error::AppError;

pub struct ChatService {
    store: Arc<dyn ChatStore>,
}

impl ChatService {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    /// Chats the user belongs to, most recently active first.
    pub async fn list_for_user(&self, user: UserId) -> Result<Vec<Chat>, AppError> {
        self.store.find_chats_for_user(user).await
    }

    /// Discover public chats by name.
    pub async fn search_public(&self, query: &str, limit: i64) -> Result<Vec<Chat>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.store.search_public_chats(query, limit).await
    }

    /// Create a chat with the creator as admin.
    pub async fn create(
        &self,
        creator: UserId,
        kind: ChatKind,
        name: Option<String>,
        members: Vec<UserId>,
    ) -> Result<Chat, AppError> {
        if kind == ChatKind::Public && name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            return Err(AppError::Validation(
                "Public chats require a name".to_string(),
            ));
        }
        self.store.create_chat(kind, name, creator, members).await
    }

    /// Add a user to a chat by username. Only admins may add members to
    /// non-public chats; anyone can be added to a public one.
    pub async fn add_member(
        &self,
        chat_id: crate::domain::ChatId,
        requester: UserId,
        username: &str,
    ) -> Result<(), AppError> {
        let chat = self
            .store
            .find_chat(chat_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Chat not found".to_string()))?;

        if chat.kind != ChatKind::Public && !chat.is_admin(requester) {
            return Err(AppError::Forbidden(
                "Only admins can add members".to_string(),
            ));
        }

        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if chat.is_member(user.id) {
            return Err(AppError::BadRequest("User already in chat".to_string()));
        }

        self.store.add_member(chat_id, user.id).await
    }
}
