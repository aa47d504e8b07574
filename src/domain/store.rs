//! Durable store interface.
//!
//! The realtime core never touches this trait directly: the HTTP layer
//! persists first, then hands the stored entity to the fan-out engine.

use async_trait::async_trait;

use crate::domain::entities::{
    Chat, ChatKind, Message, MessageContent, MessageKind, PresenceStatus, User,
};
use crate::domain::ids::{ChatId, MessageId, UserId};
use crate::shared::error::AppError;

/// Repository trait for all persistent chat data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Find all chats the user is a member of, most recently active first.
    async fn find_chats_for_user(&self, user: UserId) -> Result<Vec<Chat>, AppError>;

    /// Search public chats by name.
    async fn search_public_chats(&self, query: &str, limit: i64) -> Result<Vec<Chat>, AppError>;

    /// Create a chat with the given members; the creator becomes an admin.
    async fn create_chat(
        &self,
        kind: ChatKind,
        name: Option<String>,
        creator: UserId,
        members: Vec<UserId>,
    ) -> Result<Chat, AppError>;

    /// Find a chat by id.
    async fn find_chat(&self, chat: ChatId) -> Result<Option<Chat>, AppError>;

    /// Add a user to a chat's persisted membership.
    async fn add_member(&self, chat: ChatId, user: UserId) -> Result<(), AppError>;

    /// Persisted member ids of a chat (used to authorize joins).
    async fn chat_member_ids(&self, chat: ChatId) -> Result<Vec<UserId>, AppError>;

    /// Page through a chat's messages, oldest first within the page.
    async fn list_messages(
        &self,
        chat: ChatId,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<Message>, AppError>;

    /// Persist a new message.
    async fn insert_message(
        &self,
        chat: ChatId,
        sender: UserId,
        content: MessageContent,
        kind: MessageKind,
    ) -> Result<Message, AppError>;

    /// Denormalize the chat's most recent message for list ordering.
    async fn update_chat_last_message(
        &self,
        chat: ChatId,
        message: MessageId,
    ) -> Result<(), AppError>;

    /// Find a message by id.
    async fn find_message(&self, message: MessageId) -> Result<Option<Message>, AppError>;

    /// Set the user's reaction on a message, replacing any previous one.
    async fn set_reaction(
        &self,
        message: MessageId,
        user: UserId,
        emoji: String,
    ) -> Result<Message, AppError>;

    /// Find a user by id.
    async fn find_user(&self, user: UserId) -> Result<Option<User>, AppError>;

    /// Find a user by exact username (used when adding members by name).
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Search users by username substring, excluding the requester.
    async fn search_users(
        &self,
        query: &str,
        exclude: UserId,
        limit: i64,
    ) -> Result<Vec<User>, AppError>;

    /// Persist a user's status and bump last-seen.
    async fn update_user_status(
        &self,
        user: UserId,
        status: PresenceStatus,
    ) -> Result<User, AppError>;
}
