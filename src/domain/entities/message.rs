//! Message entity.
//!
//! Maps to the `messages` table. Content and reactions are stored as JSONB
//! documents, mirroring the nested shape of the original schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{ChatId, MessageId, UserId};

/// Kind of message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    Audio,
    Voice,
}

impl MessageKind {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s {
            "image" => Self::Image,
            "audio" => Self::Audio,
            "voice" => Self::Voice,
            _ => Self::Text,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Voice => "voice",
        }
    }
}

/// Kind of attached media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Voice,
}

/// A single media attachment. Storage and transcoding of the referenced
/// file are external concerns; only the URL travels through this server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub url: String,
    pub media_type: MediaKind,
}

/// Message body: optional text plus zero or more media attachments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    pub text: Option<String>,
    #[serde(default)]
    pub media: Vec<MediaItem>,
}

/// An emoji reaction on a message. A user holds at most one reaction per
/// message; reacting again replaces the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub user_id: UserId,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

/// Represents a persisted message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,

    pub chat_id: ChatId,

    pub sender_id: UserId,

    pub content: MessageContent,

    pub kind: MessageKind,

    #[serde(default)]
    pub reactions: Vec<Reaction>,

    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Check whether the message carries any media.
    pub fn has_media(&self) -> bool {
        !self.content.media.is_empty()
    }
}
