//! Domain Entities
//!
//! Core persistent types: users, chats, and messages.

pub mod chat;
pub mod message;
pub mod user;

pub use chat::{Chat, ChatKind};
pub use message::{MediaItem, MediaKind, Message, MessageContent, MessageKind, Reaction};
pub use user::{PresenceStatus, User};
