//! Connection Registry
//!
//! Maps each user to the set of live connection handles they own. This is
//! the source of truth for "is this user online": a user is online iff the
//! registry holds at least one handle for them.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::domain::UserId;
use crate::realtime::ConnectionId;

/// Concurrent user-to-connections index.
///
/// Both directions are kept so that a disconnect, which only knows the
/// handle, can find the owning user without a scan.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    /// All live handles per user
    handles: DashMap<UserId, HashSet<ConnectionId>>,
    /// Owning user per handle
    owners: DashMap<ConnectionId, UserId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle for a user.
    ///
    /// Returns `true` if this was the user's first live handle (the
    /// offline-to-online transition). Registering an already-known handle
    /// is a no-op and returns `false`.
    pub fn register(&self, user: UserId, conn: ConnectionId) -> bool {
        if self.owners.insert(conn, user).is_some() {
            // Duplicate registration: idempotent
            return false;
        }

        let mut handles = self.handles.entry(user).or_default();
        let first = handles.is_empty();
        handles.insert(conn);
        first
    }

    /// Remove a handle.
    ///
    /// Returns the owning user and whether this was their last handle (the
    /// online-to-offline transition). Unknown handles are a no-op.
    pub fn deregister(&self, conn: ConnectionId) -> Option<(UserId, bool)> {
        let (_, user) = self.owners.remove(&conn)?;

        let last = match self.handles.get_mut(&user) {
            Some(mut handles) => {
                handles.remove(&conn);
                handles.is_empty()
            }
            None => true,
        };

        if last {
            // Guard re-checks emptiness: a concurrent register may have
            // added a new handle between the check above and this removal.
            self.handles.remove_if(&user, |_, handles| handles.is_empty());
        }

        Some((user, last))
    }

    /// Whether the user currently holds any live handle.
    pub fn is_online(&self, user: UserId) -> bool {
        self.handles
            .get(&user)
            .map(|handles| !handles.is_empty())
            .unwrap_or(false)
    }

    /// Snapshot of the user's live handles.
    pub fn handles_of(&self, user: UserId) -> Vec<ConnectionId> {
        self.handles
            .get(&user)
            .map(|handles| handles.iter().copied().collect())
            .unwrap_or_default()
    }

    /// The user owning a handle, if the handle is live.
    pub fn owner_of(&self, conn: ConnectionId) -> Option<UserId> {
        self.owners.get(&conn).map(|user| *user)
    }

    /// Number of users with at least one live handle.
    pub fn online_user_count(&self) -> usize {
        self.handles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_handle_transitions_online() {
        let registry = ConnectionRegistry::new();
        let user = UserId::new();

        assert!(!registry.is_online(user));
        assert!(registry.register(user, ConnectionId::new()));
        assert!(registry.is_online(user));
    }

    #[test]
    fn second_handle_is_not_a_transition() {
        let registry = ConnectionRegistry::new();
        let user = UserId::new();

        assert!(registry.register(user, ConnectionId::new()));
        assert!(!registry.register(user, ConnectionId::new()));
        assert_eq!(registry.handles_of(user).len(), 2);
    }

    #[test]
    fn duplicate_registration_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let user = UserId::new();
        let conn = ConnectionId::new();

        assert!(registry.register(user, conn));
        assert!(!registry.register(user, conn));
        assert_eq!(registry.handles_of(user).len(), 1);
    }

    #[test]
    fn deregister_reports_last_handle() {
        let registry = ConnectionRegistry::new();
        let user = UserId::new();
        let first = ConnectionId::new();
        let second = ConnectionId::new();

        registry.register(user, first);
        registry.register(user, second);

        assert_eq!(registry.deregister(first), Some((user, false)));
        assert!(registry.is_online(user));

        assert_eq!(registry.deregister(second), Some((user, true)));
        assert!(!registry.is_online(user));
    }

    #[test]
    fn deregister_unknown_handle_is_noop() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.deregister(ConnectionId::new()), None);
    }

    #[test]
    fn owner_lookup() {
        let registry = ConnectionRegistry::new();
        let user = UserId::new();
        let conn = ConnectionId::new();

        registry.register(user, conn);
        assert_eq!(registry.owner_of(conn), Some(user));

        registry.deregister(conn);
        assert_eq!(registry.owner_of(conn), None);
    }
}
