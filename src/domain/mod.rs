//! Domain Layer
//!
//! Entities, typed identifiers, and the durable store trait.

pub mod entities;
pub mod ids;
pub mod store;

pub use entities::{
    Chat, ChatKind, MediaItem, MediaKind, Message, MessageContent, MessageKind, PresenceStatus,
    Reaction, User,
};
pub use ids::{ChatId, MessageId, UserId};
pub use store::ChatStore;

#[cfg(test)]
pub use store::MockChatStore;
