//! User entity.
//!
//! Maps to the `users` table. Account creation and credentials live in the
//! upstream auth service; this server only reads profiles and updates the
//! persisted status/last-seen pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::UserId;

/// Presence status of a user.
///
/// The live value is always derived from the connection registry; the copy
/// on the user row is the last status the product persisted (shown for
/// users who are not currently connected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    #[default]
    Offline,
}

impl PresenceStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s {
            "online" => Self::Online,
            _ => Self::Offline,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,

    pub username: String,

    /// URL of the avatar image, if set
    pub avatar: Option<String>,

    /// Last persisted presence status
    pub status: PresenceStatus,

    /// When the user was last seen online
    pub last_seen: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("online", PresenceStatus::Online)]
    #[test_case("offline", PresenceStatus::Offline)]
    #[test_case("garbage", PresenceStatus::Offline)]
    fn status_from_str(input: &str, expected: PresenceStatus) {
        assert_eq!(PresenceStatus::from_str(input), expected);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PresenceStatus::Online).unwrap(),
            "\"online\""
        );
    }
}
