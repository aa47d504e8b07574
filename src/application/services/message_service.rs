//! Message Service
//!
//! Message history, sending, and reactions. Sending persists the message,
//! bumps the chat's recency, and only then hands the stored row to the
//! realtime engine for fan-out.

use std::sync::Arc;

use crate::domain::{
    ChatId, ChatStore, Message, MessageContent, MessageId, MessageKind, UserId,
};
use crate::realtime::RealtimeHub;
use crate::shared::error::AppError;

const MAX_PAGE_SIZE: i64 = 100;

pub struct MessageService {
    store: Arc<dyn ChatStore>,
    hub: Arc<RealtimeHub>,
}

impl MessageService {
    pub fn new(store: Arc<dyn ChatStore>, hub: Arc<RealtimeHub>) -> Self {
        Self { store, hub }
    }

    /// Page through a chat's history. Non-members get the same 404 as a
    /// missing chat so the endpoint does not leak chat existence.
    pub async fn list(
        &self,
        chat: ChatId,
        requester: UserId,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<Message>, AppError> {
        let members = self.store.chat_member_ids(chat).await?;
        if !members.contains(&requester) {
            return Err(AppError::NotFound("Chat not found".to_string()));
        }

        self.store
            .list_messages(chat, limit.clamp(1, MAX_PAGE_SIZE), skip.max(0))
            .await
    }

    /// Persist and fan out a new message.
    pub async fn send(
        &self,
        chat: ChatId,
        sender: UserId,
        content: MessageContent,
        kind: MessageKind,
    ) -> Result<Message, AppError> {
        if content.text.is_none() && content.media.is_empty() {
            return Err(AppError::Validation("Message cannot be empty".to_string()));
        }

        let members = self.store.chat_member_ids(chat).await?;
        if !members.contains(&sender) {
            return Err(AppError::NotFound("Chat not found".to_string()));
        }

        let message = self.store.insert_message(chat, sender, content, kind).await?;
        self.store.update_chat_last_message(chat, message.id).await?;

        self.hub.dispatch(chat, message.clone());

        Ok(message)
    }

    /// Set the requester's reaction on a message, replacing any earlier one.
    pub async fn react(
        &self,
        message: MessageId,
        user: UserId,
        emoji: String,
    ) -> Result<Message, AppError> {
        self.store.set_reaction(message, user, emoji).await
    }
}
