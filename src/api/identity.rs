//! Caller identity resolution.
//!
//! The engine trusts the front proxy to authenticate users and forward the
//! verified address in `X-User-Email`. Unknown addresses are provisioned as
//! regular accounts on first request; every handler then works with an
//! explicit [`Actor`] rather than any ambient session state.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::{ApiError, AppState};
use crate::domain::{Actor, Role};

pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_NAME_HEADER: &str = "x-user-name";

pub struct Identity(pub Actor);

impl FromRequestParts<Arc<AppState>> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get(USER_EMAIL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Email header".to_string()))?;

        let name = parts
            .headers
            .get(USER_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map_or_else(
                || email.split('@').next().unwrap_or(email).to_string(),
                ToString::to_string,
            );

        let user = state.store.ensure_user(email, &name).await?;

        if !user.is_active {
            return Err(ApiError::Unauthorized(
                "Account has been deactivated".to_string(),
            ));
        }

        let role = Role::from_str(&user.role).unwrap_or(Role::User);

        Ok(Self(Actor::new(user.id, user.email, role, user.can_book)))
    }
}
