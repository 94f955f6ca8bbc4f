//! Identity provider boundary.
//!
//! The provider owns credentials: it validates bearer tokens, creates
//! accounts and changes passwords. This crate never stores a password hash.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub mod supabase;

pub use supabase::SupabaseIdentity;

/// The provider's view of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityUser {
    pub id: String,
    pub email: Option<String>,
}

/// Metadata attached to a new account, mirrored from the profile.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AccountMetadata {
    pub name: String,
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_password: Option<String>,
}

/// Account creation request. Accounts created here skip email verification
/// when `email_confirm` is set.
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub email_confirm: bool,
    pub user_metadata: AccountMetadata,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider answered and said no: bad token, duplicate email, weak
    /// password. The message is the provider's own.
    #[error("{0}")]
    Rejected(String),

    /// The provider could not be reached or answered with garbage.
    #[error("identity provider unavailable")]
    Unavailable(#[from] anyhow::Error),
}

pub type IdentityResult<T> = Result<T, IdentityError>;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves the user behind an access token.
    async fn get_user(&self, access_token: &str) -> IdentityResult<IdentityUser>;

    async fn create_user(&self, account: NewAccount) -> IdentityResult<IdentityUser>;

    async fn update_password(&self, user_id: &str, new_password: &str) -> IdentityResult<()>;
}
