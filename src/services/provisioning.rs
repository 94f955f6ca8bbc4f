//! Account provisioning: the first admin, employees, password changes.
//!
//! Each operation writes to two systems (identity provider, then profile
//! store) without a spanning transaction. A profile write that fails after
//! the account was created leaves an orphaned provider account; retrying
//! then fails on the provider's duplicate-email check. That gap is logged,
//! not compensated.

use chrono::Utc;
use rand::Rng;
use tracing::{error, info, instrument, warn};

use crate::app::AppState;
use crate::auth::Identity;
use crate::domain::provisioning::{
    AdminSignupRequest, AdminSignupResponse, AdminSummary, CreateEmployeeRequest,
    CreateEmployeeResponse, EmployeeSummary,
};
use crate::domain::{Company, Profile, Role};
use crate::error::{ApiError, ApiResult};
use crate::identity::{AccountMetadata, NewAccount};

/// Display name given to the self-service admin.
pub const ADMIN_DISPLAY_NAME: &str = "Admin";

const TEMP_PASSWORD_PREFIX: &str = "temp";
const TEMP_PASSWORD_LEN: usize = 6;
const TEMP_PASSWORD_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// `"Jane  Doe"` at `"Acme Co"` becomes `jane.doe@acmeco.com`.
///
/// No collision detection: two employees with the same name in one company
/// derive the same address.
pub fn employee_email(name: &str, company_name: &str) -> String {
    let local = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".")
        .to_lowercase();
    let domain: String = company_name
        .split_whitespace()
        .collect::<String>()
        .to_lowercase();
    format!("{local}@{domain}.com")
}

/// One-time initial password, `temp` followed by six `[a-z0-9]`. Meant to be
/// relayed by the admin and replaced on first login, not to be strong.
pub fn generate_temp_password() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..TEMP_PASSWORD_LEN)
        .map(|_| TEMP_PASSWORD_ALPHABET[rng.gen_range(0..TEMP_PASSWORD_ALPHABET.len())] as char)
        .collect();
    format!("{TEMP_PASSWORD_PREFIX}{suffix}")
}

fn require_text(value: &str, field: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Creates the single admin account together with its company record.
///
/// Refuses once any admin profile exists anywhere in the store, regardless
/// of company.
#[instrument(skip(state, req), fields(email = %req.email, company = %req.company_name))]
pub async fn admin_signup(
    state: &AppState,
    req: AdminSignupRequest,
) -> ApiResult<AdminSignupResponse> {
    let company_name = require_text(&req.company_name, "companyName")?;

    if state.profiles.admin_exists().await? {
        return Err(ApiError::conflict(
            "Admin already exists. Only one admin per company is allowed.",
        ));
    }

    let account = state
        .identity
        .create_user(NewAccount {
            email: req.email.clone(),
            password: req.password,
            email_confirm: true,
            user_metadata: AccountMetadata {
                name: ADMIN_DISPLAY_NAME.to_string(),
                company_name: company_name.clone(),
                temp_password: None,
            },
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "Admin signup rejected by identity provider");
            ApiError::from(e)
        })?;

    let now = Utc::now();
    let profile = Profile {
        id: account.id.clone(),
        name: ADMIN_DISPLAY_NAME.to_string(),
        email: req.email,
        role: Role::Admin,
        manager_id: None,
        company_name: company_name.clone(),
        temp_password: None,
        created_at: now,
    };
    let company = Company {
        name: company_name,
        admin_id: account.id.clone(),
        created_at: now,
    };

    if let Err(e) = state.profiles.put(&profile).await {
        error!(user_id = %account.id, error = ?e, "Admin account created but profile write failed; account is orphaned");
        return Err(e.into());
    }
    state.profiles.put_company(&company).await?;

    info!(user_id = %profile.id, "Admin created");

    Ok(AdminSignupResponse {
        message: "Admin created successfully".to_string(),
        user: AdminSummary {
            id: profile.id,
            email: profile.email,
            role: profile.role,
            name: profile.name,
            company_name: profile.company_name,
        },
    })
}

/// Provisions a manager or employee in the calling admin's company and hands
/// back the temporary password.
#[instrument(skip(state, admin, req), fields(admin_id = %admin.user_id, role = %req.role))]
pub async fn create_employee(
    state: &AppState,
    admin: &Identity,
    req: CreateEmployeeRequest,
) -> ApiResult<CreateEmployeeResponse> {
    if req.role.is_admin() {
        return Err(ApiError::bad_request(
            "Role must be manager or employee; only one admin may exist",
        ));
    }
    let name = require_text(&req.name, "name")?;

    let admin_profile = state
        .profiles
        .get(&admin.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin profile not found"))?;
    let company_name = admin_profile
        .company_name()
        .map(str::to_string)
        .ok_or_else(|| ApiError::not_found("Admin profile has no company"))?;

    let email = employee_email(&name, &company_name);
    let temp_password = generate_temp_password();

    let account = state
        .identity
        .create_user(NewAccount {
            email: email.clone(),
            password: temp_password.clone(),
            email_confirm: true,
            user_metadata: AccountMetadata {
                name: name.clone(),
                company_name: company_name.clone(),
                temp_password: Some(temp_password.clone()),
            },
        })
        .await
        .map_err(|e| {
            warn!(email = %email, error = %e, "Employee creation rejected by identity provider");
            ApiError::from(e)
        })?;

    let profile = Profile {
        id: account.id.clone(),
        name,
        email,
        role: req.role,
        manager_id: req.manager_id,
        company_name,
        temp_password: Some(temp_password.clone()),
        created_at: Utc::now(),
    };

    if let Err(e) = state.profiles.put(&profile).await {
        error!(user_id = %account.id, error = ?e, "Employee account created but profile write failed; account is orphaned");
        return Err(e.into());
    }

    info!(user_id = %profile.id, email = %profile.email, "Employee created");

    Ok(CreateEmployeeResponse {
        message: "Employee created successfully".to_string(),
        user: EmployeeSummary {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            role: profile.role,
            manager_id: profile.manager_id,
            temp_password,
        },
    })
}

/// Sets a new password and retires the temporary one.
///
/// Removing `tempPassword` is idempotent. If the profile write fails after
/// the provider accepted the password, the stale flag stays behind.
#[instrument(skip(state, caller, new_password), fields(user_id = %caller.user_id))]
pub async fn update_password(
    state: &AppState,
    caller: &Identity,
    new_password: &str,
) -> ApiResult<()> {
    state
        .identity
        .update_password(&caller.user_id, new_password)
        .await
        .map_err(|e| {
            warn!(error = %e, "Password update rejected by identity provider");
            ApiError::from(e)
        })?;

    if let Some(mut record) = state.profiles.get(&caller.user_id).await? {
        if record.clear_temp_password() {
            state.profiles.put_record(&caller.user_id, &record).await.map_err(|e| {
                error!(error = ?e, "Password changed but temporary password flag could not be cleared");
                ApiError::from(e)
            })?;
        }
    }

    info!("Password updated");
    Ok(())
}
