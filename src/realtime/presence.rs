//! Presence Coordinator
//!
//! Consumes connect/disconnect and explicit online/offline events, keeps
//! the connection registry current, and decides when a presence change is
//! worth announcing. Notifications are debounced per user: a second tab
//! coming up, or one of several tabs going away, produces no event. Exactly
//! one `online` per offline-to-online transition and one `offline` per
//! online-to-offline transition, however many handles the user held.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{PresenceStatus, UserId};
use crate::realtime::event::OutboundEvent;
use crate::realtime::registry::ConnectionRegistry;
use crate::realtime::ConnectionId;

/// Debounced presence state machine over the connection registry.
///
/// The registry remains the source of truth for who is online; this
/// coordinator only remembers the last status it announced per user so
/// repeated assertions of the same state stay silent.
#[derive(Debug)]
pub struct PresenceCoordinator {
    registry: Arc<ConnectionRegistry>,
    announced: DashMap<UserId, PresenceStatus>,
}

impl PresenceCoordinator {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            registry,
            announced: DashMap::new(),
        }
    }

    /// Register a new handle. Returns the broadcast to emit if this took
    /// the user from offline to online.
    pub fn on_connect(&self, user: UserId, conn: ConnectionId) -> Option<OutboundEvent> {
        self.registry.register(user, conn);
        self.announce(user, PresenceStatus::Online)
    }

    /// Deregister a handle. Returns the owning user and, if this was their
    /// last handle, the offline broadcast to emit.
    pub fn on_disconnect(&self, conn: ConnectionId) -> Option<(UserId, Option<OutboundEvent>)> {
        let (user, last) = self.registry.deregister(conn)?;
        let event = if last {
            self.announce(user, PresenceStatus::Offline)
        } else {
            None
        };
        Some((user, event))
    }

    /// Explicit online assertion from the client or HTTP layer. Re-asserts
    /// the derived state; silent unless the user genuinely transitioned.
    pub fn set_online(&self, user: UserId) -> Option<OutboundEvent> {
        if !self.registry.is_online(user) {
            return None;
        }
        self.announce(user, PresenceStatus::Online)
    }

    /// Explicit offline assertion. A no-op while the user still holds live
    /// handles; the offline broadcast fires when the last one goes away.
    pub fn set_offline(&self, user: UserId) -> Option<OutboundEvent> {
        if self.registry.is_online(user) {
            return None;
        }
        self.announce(user, PresenceStatus::Offline)
    }

    /// Record the status and build the broadcast only on an actual change.
    fn announce(&self, user: UserId, status: PresenceStatus) -> Option<OutboundEvent> {
        let changed = match self.announced.entry(user) {
            Entry::Occupied(mut entry) => {
                if *entry.get() == status {
                    false
                } else {
                    entry.insert(status);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(status);
                // Users start offline; announcing offline first would be noise
                status == PresenceStatus::Online
            }
        };

        changed.then(|| {
            tracing::debug!(user_id = %user, status = %status, "Presence changed");
            OutboundEvent::PresenceChanged {
                user_id: user,
                status,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn coordinator() -> PresenceCoordinator {
        PresenceCoordinator::new(Arc::new(ConnectionRegistry::new()))
    }

    fn online(user: UserId) -> OutboundEvent {
        OutboundEvent::PresenceChanged {
            user_id: user,
            status: PresenceStatus::Online,
        }
    }

    fn offline(user: UserId) -> OutboundEvent {
        OutboundEvent::PresenceChanged {
            user_id: user,
            status: PresenceStatus::Offline,
        }
    }

    #[test]
    fn multi_device_lifetime_announces_once_each_way() {
        let presence = coordinator();
        let user = UserId::new();
        let h1 = ConnectionId::new();
        let h2 = ConnectionId::new();

        assert_eq!(presence.on_connect(user, h1), Some(online(user)));
        assert_eq!(presence.on_connect(user, h2), None);

        assert_eq!(presence.on_disconnect(h1), Some((user, None)));
        assert_eq!(presence.on_disconnect(h2), Some((user, Some(offline(user)))));
    }

    #[test]
    fn reconnect_announces_again() {
        let presence = coordinator();
        let user = UserId::new();
        let h1 = ConnectionId::new();
        let h2 = ConnectionId::new();

        presence.on_connect(user, h1);
        presence.on_disconnect(h1);

        assert_eq!(presence.on_connect(user, h2), Some(online(user)));
    }

    #[test]
    fn explicit_online_while_connected_is_silent() {
        let presence = coordinator();
        let user = UserId::new();

        presence.on_connect(user, ConnectionId::new());
        assert_eq!(presence.set_online(user), None);
    }

    #[test]
    fn explicit_offline_with_live_handles_is_noop() {
        let presence = coordinator();
        let user = UserId::new();

        presence.on_connect(user, ConnectionId::new());
        assert_eq!(presence.set_offline(user), None);
    }

    #[test]
    fn explicit_offline_without_prior_online_is_silent() {
        let presence = coordinator();
        assert_eq!(presence.set_offline(UserId::new()), None);
    }

    #[test]
    fn disconnect_of_unknown_handle_is_noop() {
        let presence = coordinator();
        assert_eq!(presence.on_disconnect(ConnectionId::new()), None);
    }
}
