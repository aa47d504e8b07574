//! User Service
//!
//! User lookup, search, and explicit status updates. Status updates persist
//! first, then nudge the realtime engine so connected clients hear about it.

use std::sync::Arc;

use crate::domain::{ChatStore, PresenceStatus, User, UserId};
use crate::realtime::RealtimeHub;
use crate::shared::error::AppError;

pub struct UserService {
    store: Arc<dyn ChatStore>,
    hub: Arc<RealtimeHub>,
}

impl UserService {
    pub fn new(store: Arc<dyn ChatStore>, hub: Arc<RealtimeHub>) -> Self {
        Self { store, hub }
    }

    pub async fn get(&self, user: UserId) -> Result<User, AppError> {
        self.store
            .find_user(user)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Search users by username, excluding the requester themselves.
    pub async fn search(
        &self,
        query: &str,
        requester: UserId,
        limit: i64,
    ) -> Result<Vec<User>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.store.search_users(query, requester, limit).await
    }

    /// Persist the user's status, then assert it to the realtime engine.
    /// The engine only emits a broadcast when the assertion matches the
    /// user's actual connection state.
    pub async fn update_status(
        &self,
        user: UserId,
        status: PresenceStatus,
    ) -> Result<User, AppError> {
        let updated = self.store.update_user_status(user, status).await?;

        match status {
            PresenceStatus::Online => self.hub.set_online(user),
            PresenceStatus::Offline => self.hub.set_offline(user),
        }

        Ok(updated)
    }
}
