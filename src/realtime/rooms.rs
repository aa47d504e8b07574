//! Room Membership Index
//!
//! Maps a chat to the connections currently subscribed to its events. This
//! is purely a delivery-routing structure: whether the caller is a
//! persisted member of the chat is checked by the HTTP layer before join is
//! ever called. Subscriptions are ephemeral and cleared on disconnect.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::domain::ChatId;
use crate::realtime::ConnectionId;

/// Concurrent chat-to-connections index with a reverse map for cheap
/// disconnect cleanup.
#[derive(Debug, Default)]
pub struct RoomIndex {
    /// Subscribed connections per chat
    rooms: DashMap<ChatId, HashSet<ConnectionId>>,
    /// Chats each connection has joined
    joined: DashMap<ConnectionId, HashSet<ChatId>>,
}

impl RoomIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a connection to a chat's events. Idempotent.
    pub fn join(&self, chat: ChatId, conn: ConnectionId) {
        self.rooms.entry(chat).or_default().insert(conn);
        self.joined.entry(conn).or_default().insert(chat);
    }

    /// Remove a connection from one chat. Unknown pairs are a no-op.
    pub fn leave(&self, chat: ChatId, conn: ConnectionId) {
        let emptied = match self.rooms.get_mut(&chat) {
            Some(mut members) => {
                members.remove(&conn);
                members.is_empty()
            }
            None => false,
        };
        if emptied {
            self.rooms.remove_if(&chat, |_, members| members.is_empty());
        }

        let emptied = match self.joined.get_mut(&conn) {
            Some(mut chats) => {
                chats.remove(&chat);
                chats.is_empty()
            }
            None => false,
        };
        if emptied {
            self.joined.remove_if(&conn, |_, chats| chats.is_empty());
        }
    }

    /// Remove a connection from every chat it was subscribed to, returning
    /// the affected chats. Used on disconnect.
    pub fn leave_all(&self, conn: ConnectionId) -> Vec<ChatId> {
        let Some((_, chats)) = self.joined.remove(&conn) else {
            return Vec::new();
        };

        for chat in &chats {
            let emptied = match self.rooms.get_mut(chat) {
                Some(mut members) => {
                    members.remove(&conn);
                    members.is_empty()
                }
                None => false,
            };
            if emptied {
                self.rooms.remove_if(chat, |_, members| members.is_empty());
            }
        }

        chats.into_iter().collect()
    }

    /// Snapshot of the connections subscribed to a chat.
    pub fn members_of(&self, chat: ChatId) -> Vec<ConnectionId> {
        self.rooms
            .get(&chat)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether a connection is subscribed to a chat.
    pub fn is_member(&self, chat: ChatId, conn: ConnectionId) -> bool {
        self.rooms
            .get(&chat)
            .map(|members| members.contains(&conn))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn join_and_leave() {
        let rooms = RoomIndex::new();
        let chat = ChatId::new();
        let conn = ConnectionId::new();

        rooms.join(chat, conn);
        assert!(rooms.is_member(chat, conn));

        rooms.leave(chat, conn);
        assert!(!rooms.is_member(chat, conn));
        assert!(rooms.members_of(chat).is_empty());
    }

    #[test]
    fn join_is_idempotent() {
        let rooms = RoomIndex::new();
        let chat = ChatId::new();
        let conn = ConnectionId::new();

        rooms.join(chat, conn);
        rooms.join(chat, conn);
        assert_eq!(rooms.members_of(chat).len(), 1);
    }

    #[test]
    fn leave_unknown_pair_is_noop() {
        let rooms = RoomIndex::new();
        rooms.leave(ChatId::new(), ConnectionId::new());
    }

    #[test]
    fn leave_all_clears_every_room() {
        let rooms = RoomIndex::new();
        let conn = ConnectionId::new();
        let other = ConnectionId::new();
        let chats = [ChatId::new(), ChatId::new(), ChatId::new()];

        for chat in chats {
            rooms.join(chat, conn);
        }
        rooms.join(chats[0], other);

        let mut affected = rooms.leave_all(conn);
        affected.sort();
        let mut expected = chats.to_vec();
        expected.sort();
        assert_eq!(affected, expected);

        for chat in chats {
            assert!(!rooms.is_member(chat, conn));
        }
        // Other subscriptions are untouched
        assert!(rooms.is_member(chats[0], other));
    }

    #[test]
    fn leave_all_without_joins_is_empty() {
        let rooms = RoomIndex::new();
        assert!(rooms.leave_all(ConnectionId::new()).is_empty());
    }
}
