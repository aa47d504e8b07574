//! Real-time Engine
//!
//! Presence, room membership, and message fan-out across live connections.
//! All shared state lives in sharded concurrent maps; nothing in this
//! module ever awaits the durable store.

pub mod event;
pub mod fanout;
pub mod hub;
pub mod presence;
pub mod registry;
pub mod rooms;
pub mod session;
pub mod typing;

pub use event::OutboundEvent;
pub use hub::RealtimeHub;
pub use session::{ConnectionSession, EnqueueOutcome};

use std::fmt;

use uuid::Uuid;

/// Identifies one live connection. Owned by exactly one user; a user may
/// hold many concurrently (multi-device).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh connection identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
