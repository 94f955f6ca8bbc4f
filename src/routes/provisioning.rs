//! Provisioning routes
//!
//! Admin self-signup and admin-driven employee creation.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::ApiJson;
use crate::app::AppState;
use crate::auth::RequireAdmin;
use crate::domain::provisioning::{
    AdminSignupRequest, AdminSignupResponse, CreateEmployeeRequest, CreateEmployeeResponse,
};
use crate::error::ApiResult;
use crate::services::provisioning;

/// POST /admin-signup
///
/// Public. Succeeds only while no admin exists anywhere in the store.
pub async fn admin_signup(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<AdminSignupRequest>,
) -> ApiResult<Json<AdminSignupResponse>> {
    provisioning::admin_signup(&state, req).await.map(Json)
}

/// POST /create-employee
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    admin: RequireAdmin,
    ApiJson(req): ApiJson<CreateEmployeeRequest>,
) -> ApiResult<Json<CreateEmployeeResponse>> {
    provisioning::create_employee(&state, &admin, req)
        .await
        .map(Json)
}
