//! Message Fan-out
//!
//! Delivers one logical event to every connection subscribed to a chat.
//! Membership is snapshotted at call time; a connection not in the room at
//! that instant never receives the event (history replay on reconnect is
//! the durable store's job). Enqueueing never blocks: a full queue is
//! reported back so the hub can close the offender, and a closed queue is
//! silently skipped because disconnect races are expected.

use std::sync::Arc;

use dashmap::DashMap;

use crate::domain::{ChatId, Message};
use crate::realtime::event::OutboundEvent;
use crate::realtime::rooms::RoomIndex;
use crate::realtime::session::{ConnectionSession, EnqueueOutcome};
use crate::realtime::ConnectionId;

/// Shared map of live sessions by connection id.
pub(crate) type SessionMap = DashMap<ConnectionId, Arc<ConnectionSession>>;

/// Room-scoped event delivery over the session map.
pub struct MessageFanout {
    rooms: Arc<RoomIndex>,
    sessions: Arc<SessionMap>,
}

impl MessageFanout {
    pub(crate) fn new(rooms: Arc<RoomIndex>, sessions: Arc<SessionMap>) -> Self {
        Self { rooms, sessions }
    }

    /// Enqueue a persisted message to every connection in the chat's room.
    ///
    /// Sequential dispatch calls enqueue in call order to every recipient,
    /// so no recipient ever observes two messages of one chat reordered.
    /// Returns the connections whose queues overflowed.
    pub fn dispatch(&self, chat: ChatId, message: Message) -> Vec<ConnectionId> {
        let event = OutboundEvent::NewMessage {
            chat_id: chat,
            message,
        };
        let overflowed = self.send_to_room(chat, event, None);
        tracing::trace!(chat_id = %chat, "Message fanned out");
        overflowed
    }

    /// Enqueue an event to the chat's room, optionally excluding one
    /// connection (the originator of a typing notification). Returns the
    /// connections whose queues overflowed.
    pub fn send_to_room(
        &self,
        chat: ChatId,
        event: OutboundEvent,
        exclude: Option<ConnectionId>,
    ) -> Vec<ConnectionId> {
        let mut overflowed = Vec::new();

        for conn in self.rooms.members_of(chat) {
            if exclude == Some(conn) {
                continue;
            }
            // A member without a session is mid-disconnect; skip it.
            let Some(session) = self.sessions.get(&conn).map(|s| Arc::clone(&s)) else {
                continue;
            };
            match session.enqueue(event.clone()) {
                EnqueueOutcome::Delivered | EnqueueOutcome::Closed => {}
                EnqueueOutcome::Overflowed => overflowed.push(conn),
            }
        }

        overflowed
    }
}
