//! Outbound Events
//!
//! The only values ever pushed onto a connection's send queue. Wire framing
//! lives in the websocket transport; the core deals in these variants only.

use crate::domain::{ChatId, Message, PresenceStatus, UserId};

/// An event destined for a live connection.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// A message already persisted by the durable store, fanned out to a
    /// chat's room.
    NewMessage { chat_id: ChatId, message: Message },

    /// A user started typing in a chat.
    TypingStart { chat_id: ChatId, user_id: UserId },

    /// A user stopped typing, either explicitly or by expiry.
    TypingStop { chat_id: ChatId, user_id: UserId },

    /// A user transitioned between online and offline. Broadcast to every
    /// connection, not room-scoped.
    PresenceChanged {
        user_id: UserId,
        status: PresenceStatus,
    },
}
