//! Profile routes
//!
//! The caller's own profile, the admin user directory, and password changes.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::{ApiJson, MessageResponse};
use crate::app::AppState;
use crate::auth::{RequireAdmin, RequireUser};
use crate::domain::provisioning::{ProfileEnvelope, UpdatePasswordRequest, UsersEnvelope};
use crate::error::ApiResult;
use crate::services::{directory, provisioning};

/// GET /profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    auth: RequireUser,
) -> ApiResult<Json<ProfileEnvelope>> {
    let profile = directory::get_profile(&state, &auth).await?;
    Ok(Json(ProfileEnvelope { profile }))
}

/// GET /users
///
/// Admin only. Lists every profile in the store.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
) -> ApiResult<Json<UsersEnvelope>> {
    let users = directory::list_users(&state).await?;
    Ok(Json(UsersEnvelope { users }))
}

/// POST /update-password
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    auth: RequireUser,
    ApiJson(req): ApiJson<UpdatePasswordRequest>,
) -> ApiResult<MessageResponse> {
    provisioning::update_password(&state, &auth, &req.new_password).await?;
    Ok(MessageResponse::new("Password updated successfully"))
}
