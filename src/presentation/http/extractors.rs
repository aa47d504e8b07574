//! Request Extractors
//!
//! Identifies the requester from the `x-user-id` header. Session and token
//! verification sit in front of this service; by the time a request lands
//! here the gateway has already stamped the authenticated user id.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::UserId;
use crate::shared::error::AppError;

/// The authenticated user making the request.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing x-user-id header".to_string()))?;

        let user = raw
            .parse::<UserId>()
            .map_err(|_| AppError::Unauthorized("Invalid x-user-id header".to_string()))?;

        Ok(CurrentUser(user))
    }
}
