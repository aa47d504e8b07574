//! Typing Coordinator
//!
//! Ephemeral per-(chat, user) typing sessions with server-side expiry. The
//! original client armed a local timer and hoped to send a stop event; a
//! crashed or disconnected client would leave the indicator stuck. Here the
//! deadline is authoritative on the server: a session not refreshed within
//! the window expires and emits exactly one stop.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time::{Duration, Instant};

use crate::domain::{ChatId, UserId};

/// Typing window matching the original product behavior.
pub const DEFAULT_TYPING_TTL: Duration = Duration::from_secs(3);

/// Concurrent typing-session table keyed by (chat, user).
#[derive(Debug)]
pub struct TypingCoordinator {
    sessions: DashMap<(ChatId, UserId), Instant>,
    ttl: Duration,
}

impl TypingCoordinator {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Create or refresh the typing session.
    ///
    /// Returns `true` only on the transition from no session to session,
    /// i.e. when a start notification should go out. Repeated keystrokes
    /// within the window refresh the deadline silently.
    pub fn start(&self, chat: ChatId, user: UserId) -> bool {
        let deadline = Instant::now() + self.ttl;
        match self.sessions.entry((chat, user)) {
            Entry::Occupied(mut entry) => {
                entry.insert(deadline);
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(deadline);
                true
            }
        }
    }

    /// Explicitly end the typing session.
    ///
    /// Returns `true` if a session existed, i.e. when a stop notification
    /// should go out. A stop arriving after expiry already fired finds no
    /// session and stays silent.
    pub fn stop(&self, chat: ChatId, user: UserId) -> bool {
        self.sessions.remove(&(chat, user)).is_some()
    }

    /// Remove every session whose deadline has passed, returning the pairs
    /// that expired. Each expired session is returned exactly once; a
    /// concurrent refresh keeps its session alive.
    pub fn collect_expired(&self) -> Vec<(ChatId, UserId)> {
        let now = Instant::now();

        let candidates: Vec<(ChatId, UserId)> = self
            .sessions
            .iter()
            .filter(|entry| *entry.value() <= now)
            .map(|entry| *entry.key())
            .collect();

        candidates
            .into_iter()
            .filter(|key| {
                self.sessions
                    .remove_if(key, |_, deadline| *deadline <= now)
                    .is_some()
            })
            .collect()
    }

    /// Number of live typing sessions.
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test(start_paused = true)]
    async fn repeated_starts_emit_once() {
        let typing = TypingCoordinator::new(DEFAULT_TYPING_TTL);
        let chat = ChatId::new();
        let user = UserId::new();

        assert!(typing.start(chat, user));
        for _ in 0..10 {
            assert!(!typing.start(chat, user));
        }
        assert_eq!(typing.active_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn session_expires_once_after_window() {
        let typing = TypingCoordinator::new(DEFAULT_TYPING_TTL);
        let chat = ChatId::new();
        let user = UserId::new();

        typing.start(chat, user);
        assert!(typing.collect_expired().is_empty());

        tokio::time::advance(Duration::from_secs(4)).await;

        assert_eq!(typing.collect_expired(), vec![(chat, user)]);
        // Already expired: nothing more to report
        assert!(typing.collect_expired().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_extends_the_deadline() {
        let typing = TypingCoordinator::new(DEFAULT_TYPING_TTL);
        let chat = ChatId::new();
        let user = UserId::new();

        typing.start(chat, user);
        tokio::time::advance(Duration::from_secs(2)).await;
        typing.start(chat, user);
        tokio::time::advance(Duration::from_secs(2)).await;

        // 4s since first start but only 2s since refresh
        assert!(typing.collect_expired().is_empty());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(typing.collect_expired(), vec![(chat, user)]);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_stop_cancels_expiry() {
        let typing = TypingCoordinator::new(DEFAULT_TYPING_TTL);
        let chat = ChatId::new();
        let user = UserId::new();

        typing.start(chat, user);
        assert!(typing.stop(chat, user));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(typing.collect_expired().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_after_expiry_is_silent() {
        let typing = TypingCoordinator::new(DEFAULT_TYPING_TTL);
        let chat = ChatId::new();
        let user = UserId::new();

        typing.start(chat, user);
        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(typing.collect_expired().len(), 1);

        assert!(!typing.stop(chat, user));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_without_session_is_silent() {
        let typing = TypingCoordinator::new(DEFAULT_TYPING_TTL);
        assert!(!typing.stop(ChatId::new(), UserId::new()));
    }
}
