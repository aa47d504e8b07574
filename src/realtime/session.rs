//! Connection Session
//!
//! One live bidirectional channel to a single client. The session owns a
//! bounded outbound queue; a single drain task on the transport side
//! serializes writes, so concurrent producers never interleave partial
//! frames. A session that falls a full queue behind is forcibly closed
//! rather than allowed to grow without bound.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::watch;

use crate::domain::UserId;
use crate::realtime::event::OutboundEvent;
use crate::realtime::ConnectionId;

/// Result of pushing an event onto a session's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Event accepted
    Delivered,
    /// Queue full; the session must be force-closed
    Overflowed,
    /// Receiver already gone; event silently dropped
    Closed,
}

/// Handle to one live client connection.
pub struct ConnectionSession {
    id: ConnectionId,
    user_id: UserId,
    outbound: mpsc::Sender<OutboundEvent>,
    close_tx: watch::Sender<bool>,
}

impl ConnectionSession {
    /// Create a session with a bounded outbound queue. Returns the session
    /// and the receiving end the transport drains.
    pub(crate) fn new(
        user_id: UserId,
        capacity: usize,
    ) -> (Arc<Self>, mpsc::Receiver<OutboundEvent>) {
        let (outbound, rx) = mpsc::channel(capacity);
        let (close_tx, _) = watch::channel(false);

        let session = Arc::new(Self {
            id: ConnectionId::new(),
            user_id,
            outbound,
            close_tx,
        });

        (session, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Push an event onto the outbound queue without blocking.
    pub fn enqueue(&self, event: OutboundEvent) -> EnqueueOutcome {
        if self.is_closed() {
            return EnqueueOutcome::Closed;
        }
        match self.outbound.try_send(event) {
            Ok(()) => EnqueueOutcome::Delivered,
            Err(TrySendError::Full(_)) => EnqueueOutcome::Overflowed,
            Err(TrySendError::Closed(_)) => EnqueueOutcome::Closed,
        }
    }

    /// Signal the transport to tear the connection down.
    pub fn close(&self) {
        let _ = self.close_tx.send(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.close_tx.borrow()
    }

    /// Watch channel the transport selects on to observe a forced close.
    pub fn close_signal(&self) -> watch::Receiver<bool> {
        self.close_tx.subscribe()
    }
}

impl std::fmt::Debug for ConnectionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSession")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PresenceStatus;

    fn presence_event() -> OutboundEvent {
        OutboundEvent::PresenceChanged {
            user_id: UserId::new(),
            status: PresenceStatus::Online,
        }
    }

    #[test]
    fn enqueue_delivers_until_capacity() {
        let (session, _rx) = ConnectionSession::new(UserId::new(), 2);

        assert_eq!(session.enqueue(presence_event()), EnqueueOutcome::Delivered);
        assert_eq!(session.enqueue(presence_event()), EnqueueOutcome::Delivered);
        assert_eq!(session.enqueue(presence_event()), EnqueueOutcome::Overflowed);
    }

    #[test]
    fn enqueue_after_close_is_dropped() {
        let (session, _rx) = ConnectionSession::new(UserId::new(), 4);
        session.close();
        assert_eq!(session.enqueue(presence_event()), EnqueueOutcome::Closed);
    }

    #[test]
    fn enqueue_after_receiver_dropped_is_dropped() {
        let (session, rx) = ConnectionSession::new(UserId::new(), 4);
        drop(rx);
        assert_eq!(session.enqueue(presence_event()), EnqueueOutcome::Closed);
    }

    #[test]
    fn close_signal_observes_close() {
        let (session, _rx) = ConnectionSession::new(UserId::new(), 4);
        let signal = session.close_signal();

        assert!(!*signal.borrow());
        session.close();
        assert!(*signal.borrow());
    }
}
