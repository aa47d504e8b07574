//! Response DTOs
//!
//! Bodies whose shape differs from the entity itself; everything else is
//! serialized straight from the domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::PresenceStatus;

/// Body of a successful status update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: PresenceStatus,
    pub last_seen: DateTime<Utc>,
}

/// Confirmation body for member addition.
#[derive(Debug, Serialize)]
pub struct MemberAddedResponse {
    pub message: &'static str,
}

/// Health check body with live engine counters.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub connections: usize,
    pub online_users: usize,
}
