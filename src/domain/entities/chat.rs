//! Chat entity.
//!
//! Maps to the `chats` table plus the `chat_members` join table. Membership
//! here is the *persisted* membership used for authorization; the live
//! delivery routing is the realtime room index, which is rebuilt from join
//! calls every session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{ChatId, MessageId, UserId};

/// Kind of chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    /// One-to-one or ad-hoc group conversation
    #[default]
    Private,
    /// Publicly searchable and joinable
    Public,
    /// Invisible to search, invite only
    Secret,
}

impl ChatKind {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s {
            "public" => Self::Public,
            "secret" => Self::Secret,
            _ => Self::Private,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
            Self::Secret => "secret",
        }
    }
}

impl std::fmt::Display for ChatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a chat room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,

    pub kind: ChatKind,

    /// Display name; required for public chats, absent for one-to-one chats
    pub name: Option<String>,

    /// Persisted members
    pub members: Vec<UserId>,

    /// Members allowed to manage the chat
    pub admins: Vec<UserId>,

    pub is_group: bool,

    /// URL of the group avatar image, if set
    pub group_avatar: Option<String>,

    /// Most recent message, denormalized for chat-list ordering
    pub last_message_id: Option<MessageId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Chat {
    /// Check whether a user is a persisted member of this chat.
    pub fn is_member(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }

    /// Check whether a user is an admin of this chat.
    pub fn is_admin(&self, user: UserId) -> bool {
        self.admins.contains(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("private", ChatKind::Private)]
    #[test_case("public", ChatKind::Public)]
    #[test_case("secret", ChatKind::Secret)]
    #[test_case("unknown", ChatKind::Private)]
    fn kind_from_str(input: &str, expected: ChatKind) {
        assert_eq!(ChatKind::from_str(input), expected);
    }
}
