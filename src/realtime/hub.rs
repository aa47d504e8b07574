//! Realtime Hub
//!
//! Facade over the realtime engine. The websocket transport and the HTTP
//! handlers talk to the hub; the hub wires connection lifecycle, room
//! membership, presence, typing, and fan-out together and owns the one
//! resource-exhaustion policy in the core: a connection whose queue
//! overflows is closed through the normal disconnect path.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::config::RealtimeSettings;
use crate::domain::{ChatId, Message, UserId};
use crate::realtime::event::OutboundEvent;
use crate::realtime::fanout::{MessageFanout, SessionMap};
use crate::realtime::presence::PresenceCoordinator;
use crate::realtime::registry::ConnectionRegistry;
use crate::realtime::rooms::RoomIndex;
use crate::realtime::session::{ConnectionSession, EnqueueOutcome};
use crate::realtime::typing::TypingCoordinator;
use crate::realtime::ConnectionId;

/// Central realtime engine shared across all connections and handlers.
pub struct RealtimeHub {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomIndex>,
    sessions: Arc<SessionMap>,
    presence: PresenceCoordinator,
    typing: TypingCoordinator,
    fanout: MessageFanout,
    settings: RealtimeSettings,
}

impl RealtimeHub {
    pub fn new(settings: RealtimeSettings) -> Arc<Self> {
        let registry = Arc::new(ConnectionRegistry::new());
        let rooms = Arc::new(RoomIndex::new());
        let sessions: Arc<SessionMap> = Arc::new(SessionMap::new());

        Arc::new(Self {
            presence: PresenceCoordinator::new(Arc::clone(&registry)),
            typing: TypingCoordinator::new(Duration::from_secs(settings.typing_ttl_secs)),
            fanout: MessageFanout::new(Arc::clone(&rooms), Arc::clone(&sessions)),
            registry,
            rooms,
            sessions,
            settings,
        })
    }

    /// Open a session for a user's new connection.
    ///
    /// Registers the handle, and if this took the user online, broadcasts
    /// the presence change to every connection. Returns the session handle
    /// and the queue receiver the transport drains.
    pub fn connect(
        &self,
        user: UserId,
    ) -> (
        Arc<ConnectionSession>,
        tokio::sync::mpsc::Receiver<OutboundEvent>,
    ) {
        let (session, rx) = ConnectionSession::new(user, self.settings.send_queue_capacity);
        let conn = session.id();
        self.sessions.insert(conn, Arc::clone(&session));

        if let Some(event) = self.presence.on_connect(user, conn) {
            self.broadcast(event);
        }

        tracing::info!(user_id = %user, connection_id = %conn, "Connection opened");
        (session, rx)
    }

    /// Tear down a connection: close its queue, drop all of its room
    /// subscriptions, deregister the handle, and broadcast offline if it
    /// was the user's last one. Idempotent; races with an already-finished
    /// disconnect are no-ops.
    pub fn disconnect(&self, conn: ConnectionId) {
        if let Some((_, session)) = self.sessions.remove(&conn) {
            session.close();
        }

        self.rooms.leave_all(conn);

        if let Some((user, event)) = self.presence.on_disconnect(conn) {
            tracing::info!(user_id = %user, connection_id = %conn, "Connection closed");
            if let Some(event) = event {
                self.broadcast(event);
            }
        }
    }

    /// Subscribe a connection to a chat's events. Authorization against
    /// persisted membership happens in the HTTP layer before this call.
    pub fn join(&self, conn: ConnectionId, chat: ChatId) {
        // A handle that already disconnected must not re-enter the index.
        if !self.sessions.contains_key(&conn) {
            return;
        }
        self.rooms.join(chat, conn);
        tracing::debug!(connection_id = %conn, chat_id = %chat, "Joined chat room");
    }

    /// Unsubscribe a connection from a chat's events.
    pub fn leave(&self, conn: ConnectionId, chat: ChatId) {
        self.rooms.leave(chat, conn);
        tracing::debug!(connection_id = %conn, chat_id = %chat, "Left chat room");
    }

    /// Fan a persisted message out to the chat's current room members.
    pub fn dispatch(&self, chat: ChatId, message: Message) {
        for conn in self.fanout.dispatch(chat, message) {
            self.force_close(conn);
        }
    }

    /// Start (or refresh) a typing indicator. Emits a start notification to
    /// the room only on the first call within the window; the originating
    /// connection does not hear its own indicator.
    pub fn typing_start(&self, chat: ChatId, user: UserId, from: Option<ConnectionId>) {
        if !self.typing.start(chat, user) {
            return;
        }
        let event = OutboundEvent::TypingStart {
            chat_id: chat,
            user_id: user,
        };
        for conn in self.fanout.send_to_room(chat, event, from) {
            self.force_close(conn);
        }
    }

    /// Explicitly stop a typing indicator, cancelling the pending expiry.
    /// Silent if the session already expired.
    pub fn typing_stop(&self, chat: ChatId, user: UserId, from: Option<ConnectionId>) {
        if !self.typing.stop(chat, user) {
            return;
        }
        let event = OutboundEvent::TypingStop {
            chat_id: chat,
            user_id: user,
        };
        for conn in self.fanout.send_to_room(chat, event, from) {
            self.force_close(conn);
        }
    }

    /// Explicit online assertion (client event or HTTP status update).
    pub fn set_online(&self, user: UserId) {
        if let Some(event) = self.presence.set_online(user) {
            self.broadcast(event);
        }
    }

    /// Explicit offline assertion. No-op while live handles remain.
    pub fn set_offline(&self, user: UserId) {
        if let Some(event) = self.presence.set_offline(user) {
            self.broadcast(event);
        }
    }

    /// Whether the user currently holds any live connection.
    pub fn is_online(&self, user: UserId) -> bool {
        self.registry.is_online(user)
    }

    /// Snapshot of the connections subscribed to a chat.
    pub fn room_members(&self, chat: ChatId) -> Vec<ConnectionId> {
        self.rooms.members_of(chat)
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of distinct online users.
    pub fn online_user_count(&self) -> usize {
        self.registry.online_user_count()
    }

    /// Periodically expire typing sessions and notify their rooms.
    pub fn spawn_typing_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let hub = Arc::clone(self);
        let period = Duration::from_millis(hub.settings.typing_sweep_interval_ms);

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                for (chat, user) in hub.typing.collect_expired() {
                    tracing::debug!(chat_id = %chat, user_id = %user, "Typing session expired");
                    let event = OutboundEvent::TypingStop {
                        chat_id: chat,
                        user_id: user,
                    };
                    for conn in hub.fanout.send_to_room(chat, event, None) {
                        hub.force_close(conn);
                    }
                }
            }
        })
    }

    /// Push an event to every live connection (presence changes).
    fn broadcast(&self, event: OutboundEvent) {
        let mut overflowed = Vec::new();

        for entry in self.sessions.iter() {
            match entry.value().enqueue(event.clone()) {
                EnqueueOutcome::Delivered | EnqueueOutcome::Closed => {}
                EnqueueOutcome::Overflowed => overflowed.push(*entry.key()),
            }
        }

        // Close offenders only after releasing the iterator's shard locks.
        for conn in overflowed {
            self.force_close(conn);
        }
    }

    /// Bounded-queue policy: a connection that cannot keep up is closed so
    /// one slow client cannot stall fan-out to the others.
    fn force_close(&self, conn: ConnectionId) {
        tracing::warn!(connection_id = %conn, "Send queue overflow, closing connection");
        self.disconnect(conn);
    }
}

impl std::fmt::Debug for RealtimeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeHub")
            .field("connections", &self.sessions.len())
            .field("online_users", &self.registry.online_user_count())
            .field("typing_sessions", &self.typing.active_count())
            .finish()
    }
}
