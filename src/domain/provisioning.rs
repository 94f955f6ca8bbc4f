//! Request and response bodies for the provisioning and directory endpoints.

use serde::{Deserialize, Serialize};

use super::{ProfileRecord, Role};

/// POST /admin-signup
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSignupRequest {
    pub email: String,
    pub password: String,
    pub company_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub name: String,
    pub company_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminSignupResponse {
    pub message: String,
    pub user: AdminSummary,
}

/// POST /create-employee
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub manager_id: Option<String>,
}

/// The only place the temporary password is ever handed out.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    pub temp_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateEmployeeResponse {
    pub message: String,
    pub user: EmployeeSummary,
}

/// POST /update-password
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub new_password: String,
}

/// GET /profile
#[derive(Debug, Clone, Serialize)]
pub struct ProfileEnvelope {
    pub profile: ProfileRecord,
}

/// GET /users
#[derive(Debug, Clone, Serialize)]
pub struct UsersEnvelope {
    pub users: Vec<ProfileRecord>,
}
