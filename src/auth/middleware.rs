//! Authorization gate shared by every protected handler.
//!
//! `resolve_user` and `resolve_admin` turn a request's headers into an
//! [`AccessDecision`]. The `RequireUser` / `RequireAdmin` extractors run
//! them before the handler body (and before the JSON body is parsed), so a
//! handler that names one of them cannot forget the check.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use std::sync::Arc;

use super::Identity;
use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::identity::{IdentityError, IdentityProvider};
use crate::store::ProfileStore;

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// No token, a malformed header, or a token the provider refused.
    Unauthenticated,
    /// A valid identity without the required role.
    Unauthorized,
    Authorized(Identity),
}

impl AccessDecision {
    pub fn identity(self) -> Option<Identity> {
        match self {
            Self::Authorized(identity) => Some(identity),
            _ => None,
        }
    }

    /// Converts anything but `Authorized` into a 401 with `message`.
    pub fn require(self, message: &str) -> ApiResult<Identity> {
        self.identity()
            .ok_or_else(|| ApiError::unauthorized(message))
    }
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let Authorization(bearer) = headers.typed_get::<Authorization<Bearer>>()?;
    let token = bearer.token().trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Resolves the caller's identity. Never fails: every problem means
/// "no identity".
pub async fn resolve_user(identity: &dyn IdentityProvider, headers: &HeaderMap) -> AccessDecision {
    let Some(token) = bearer_token(headers) else {
        return AccessDecision::Unauthenticated;
    };

    match identity.get_user(&token).await {
        Ok(user) => AccessDecision::Authorized(user.into()),
        Err(IdentityError::Rejected(msg)) => {
            tracing::debug!(reason = %msg, "Bearer token rejected");
            AccessDecision::Unauthenticated
        }
        Err(IdentityError::Unavailable(e)) => {
            tracing::warn!(error = ?e, "Token lookup failed");
            AccessDecision::Unauthenticated
        }
    }
}

/// Resolves the caller and additionally requires an admin profile. Only the
/// stored `role` field matters, so a profile in an unexpected shape is just
/// not admin. Fails only when the profile store itself fails.
pub async fn resolve_admin(
    identity: &dyn IdentityProvider,
    profiles: &ProfileStore,
    headers: &HeaderMap,
) -> ApiResult<AccessDecision> {
    let caller = match resolve_user(identity, headers).await {
        AccessDecision::Authorized(caller) => caller,
        other => return Ok(other),
    };

    if !profiles.is_admin(&caller.user_id).await? {
        tracing::warn!(user_id = %caller.user_id, "Non-admin user attempted an admin operation");
        return Ok(AccessDecision::Unauthorized);
    }

    Ok(AccessDecision::Authorized(caller))
}

/// Extractor that requires an authenticated caller.
#[derive(Debug, Clone)]
pub struct RequireUser(pub Identity);

impl std::ops::Deref for RequireUser {
    type Target = Identity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        resolve_user(state.identity.as_ref(), &parts.headers)
            .await
            .require("Authentication required")
            .map(RequireUser)
    }
}

/// Extractor that requires an authenticated caller whose profile role is
/// admin.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Identity);

impl std::ops::Deref for RequireAdmin {
    type Target = Identity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        resolve_admin(state.identity.as_ref(), &state.profiles, &parts.headers)
            .await?
            .require("Admin access required")
            .map(RequireAdmin)
    }
}
