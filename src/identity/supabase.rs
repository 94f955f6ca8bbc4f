//! Supabase Auth (GoTrue) client.
//!
//! Token lookups go to `/auth/v1/user` unless a JWKS cache is configured, in
//! which case tokens are verified locally. Account management uses the
//! admin API with the service-role key.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{IdentityError, IdentityProvider, IdentityResult, IdentityUser, NewAccount};
use crate::auth::JwksCache;
use crate::config::Settings;

#[derive(Debug, Clone, Deserialize)]
struct SupabaseUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Admin endpoints answer with either the bare user or `{ "user": ... }`
/// depending on the GoTrue version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserPayload {
    Wrapped { user: SupabaseUser },
    Bare(SupabaseUser),
}

impl From<UserPayload> for IdentityUser {
    fn from(payload: UserPayload) -> Self {
        let user = match payload {
            UserPayload::Wrapped { user } => user,
            UserPayload::Bare(user) => user,
        };
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// GoTrue error body. Newer versions send `msg`/`error_code`, older ones
/// `error`/`error_description`, some proxies `message`.
#[derive(Debug, Clone, Default, Deserialize)]
struct SupabaseErrorResponse {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl SupabaseErrorResponse {
    fn into_message(self, status: StatusCode) -> String {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| format!("Identity provider returned {status}"))
    }
}

#[derive(Clone)]
pub struct SupabaseIdentity {
    http: reqwest::Client,
    base_url: Url,
    service_role_key: String,
    /// `apikey` sent alongside user tokens.
    public_key: String,
    jwks: Option<JwksCache>,
}

impl SupabaseIdentity {
    pub fn new(
        http: reqwest::Client,
        supabase_url: &str,
        service_role_key: &str,
        anon_key: Option<&str>,
        jwks: Option<JwksCache>,
    ) -> Result<Self> {
        let base_url = Url::parse(supabase_url).context("SUPABASE_URL is not a valid URL")?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("SUPABASE_URL cannot be used as a base URL");
        }

        Ok(Self {
            http,
            base_url,
            service_role_key: service_role_key.to_string(),
            public_key: anon_key.unwrap_or(service_role_key).to_string(),
            jwks,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.identity_timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        let jwks = settings.supabase_jwt_jwks_url.as_ref().map(|jwks_url| {
            JwksCache::new(
                http.clone(),
                jwks_url.clone(),
                settings.supabase_jwt_issuer.clone(),
                settings.supabase_jwt_audience.clone(),
                settings.jwks_cache_ttl_seconds,
            )
        });

        Self::new(
            http,
            &settings.supabase_url,
            &settings.supabase_service_role_key,
            settings.supabase_anon_key.as_deref(),
            jwks,
        )
    }

    pub fn jwks(&self) -> Option<&JwksCache> {
        self.jwks.as_ref()
    }

    /// `{base}/auth/v1/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("SUPABASE_URL cannot be used as a base URL"))?
            .pop_if_empty()
            .extend(["auth", "v1"])
            .extend(segments);
        Ok(url)
    }

    async fn fetch_user(&self, access_token: &str) -> IdentityResult<IdentityUser> {
        let response = self
            .http
            .get(self.endpoint(&["user"])?)
            .header("apikey", &self.public_key)
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to connect to auth service")?;

        let payload: UserPayload = read_success(response).await?;
        Ok(payload.into())
    }
}

/// Turns a non-2xx answer into `Rejected` with the provider's message and
/// decodes a 2xx body as `T`.
async fn read_success<T: serde::de::DeserializeOwned>(response: Response) -> IdentityResult<T> {
    let status = response.status();
    if !status.is_success() {
        let error: SupabaseErrorResponse = response.json().await.unwrap_or_default();
        let message = error.into_message(status);
        debug!(status = %status, message = %message, "Identity provider rejected request");
        return Err(IdentityError::Rejected(message));
    }

    let body = response
        .json()
        .await
        .context("Failed to parse auth service response")?;
    Ok(body)
}

#[async_trait]
impl IdentityProvider for SupabaseIdentity {
    async fn get_user(&self, access_token: &str) -> IdentityResult<IdentityUser> {
        let Some(jwks) = &self.jwks else {
            return self.fetch_user(access_token).await;
        };

        let claims = jwks.verify_token(access_token).await.map_err(|e| {
            warn!(error = %e, "JWT verification failed");
            IdentityError::Rejected("Invalid or expired token".to_string())
        })?;

        Ok(IdentityUser {
            id: claims.sub,
            email: claims.email,
        })
    }

    async fn create_user(&self, account: NewAccount) -> IdentityResult<IdentityUser> {
        let response = self
            .http
            .post(self.endpoint(&["admin", "users"])?)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .json(&account)
            .send()
            .await
            .context("Failed to connect to auth service")?;

        let payload: UserPayload = read_success(response).await?;
        Ok(payload.into())
    }

    async fn update_password(&self, user_id: &str, new_password: &str) -> IdentityResult<()> {
        let response = self
            .http
            .put(self.endpoint(&["admin", "users", user_id])?)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .json(&serde_json::json!({ "password": new_password }))
            .send()
            .await
            .context("Failed to connect to auth service")?;

        let _: serde_json::Value = read_success(response).await?;
        Ok(())
    }
}
