use serde::{Deserialize, Serialize};

/// JWT claims carried by Supabase access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity provider user id)
    pub sub: String,

    pub iss: String,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    #[serde(default)]
    pub iat: Option<i64>,

    #[serde(default)]
    pub email: Option<String>,

    /// Postgres role of the session (`authenticated`, `anon`). Unrelated to
    /// the profile role.
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub session_id: Option<String>,
}
