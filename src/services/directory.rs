//! Profile reads for the caller and the admin directory.

use crate::app::AppState;
use crate::auth::Identity;
use crate::domain::ProfileRecord;
use crate::error::{ApiError, ApiResult};

/// The caller's stored record, returned as stored.
pub async fn get_profile(state: &AppState, caller: &Identity) -> ApiResult<ProfileRecord> {
    state
        .profiles
        .get(&caller.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))
}

/// Every profile in the store, including ones with roles or shapes this
/// service would not write itself. Not scoped to the admin's company.
pub async fn list_users(state: &AppState) -> ApiResult<Vec<ProfileRecord>> {
    let users = state.profiles.list().await?;
    tracing::debug!(count = users.len(), "Listed users");
    Ok(users)
}
