use anyhow::{bail, Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

/// Shape of log output. Defaults to JSON in production and pretty elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    pub fn resolve(raw: Option<&str>, env: &Environment) -> Result<Self> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(if env.is_prod() { Self::Json } else { Self::Pretty });
        };
        match raw.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => bail!("unknown LOG_FORMAT: {other}"),
        }
    }
}

/// Which key-value backend holds profiles and companies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl StoreBackend {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => bail!("unknown PROFILE_STORE backend: {other}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub log_format: LogFormat,
    pub server_addr: String,
    pub api_prefix: String,

    // CORS
    pub cors_allow_origins: Vec<String>,
    pub cors_max_age_seconds: u64,

    pub request_body_limit_bytes: usize,

    // Supabase API (identity provider)
    pub supabase_url: String,
    pub supabase_service_role_key: String,
    pub supabase_anon_key: Option<String>,
    pub identity_timeout_seconds: u64,

    // Local JWT verification, enabled when a JWKS URL is configured
    pub supabase_jwt_jwks_url: Option<String>,
    pub supabase_jwt_issuer: String,
    pub supabase_jwt_audience: String,
    pub jwks_cache_ttl_seconds: u64,

    // Key-value store
    pub profile_store: StoreBackend,
    pub redis_url: String,
    pub redis_key_prefix: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let log_format = LogFormat::resolve(env::var("LOG_FORMAT").ok().as_deref(), &env)?;
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let api_prefix = normalize_prefix(
            &env::var("API_PREFIX").unwrap_or_else(|_| "/make-server-0c780f05".to_string()),
        );

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let cors_max_age_seconds = parse_or("CORS_MAX_AGE_SECONDS", 600);

        let request_body_limit_bytes = parse_or("REQUEST_BODY_LIMIT_BYTES", 64 * 1024);

        // Supabase API
        let supabase_url = env::var("SUPABASE_URL")
            .context("SUPABASE_URL must be set")?
            .trim_end_matches('/')
            .to_string();
        let supabase_service_role_key = env::var("SUPABASE_SERVICE_ROLE_KEY")
            .context("SUPABASE_SERVICE_ROLE_KEY must be set")?;
        let supabase_anon_key = env::var("SUPABASE_ANON_KEY").ok().filter(|s| !s.is_empty());
        let identity_timeout_seconds = parse_or("IDENTITY_TIMEOUT_SECONDS", 10);

        // Supabase Auth
        let supabase_jwt_jwks_url = env::var("SUPABASE_JWT_JWKS_URL")
            .ok()
            .filter(|s| !s.is_empty());
        let supabase_jwt_issuer = env::var("SUPABASE_JWT_ISSUER")
            .unwrap_or_else(|_| format!("{supabase_url}/auth/v1"));
        let supabase_jwt_audience =
            env::var("SUPABASE_JWT_AUDIENCE").unwrap_or_else(|_| "authenticated".to_string());
        let jwks_cache_ttl_seconds = parse_or("JWKS_CACHE_TTL_SECONDS", 1800); // 30 minutes

        // Key-value store
        let profile_store =
            StoreBackend::parse(&env::var("PROFILE_STORE").unwrap_or_else(|_| "redis".to_string()))?;
        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string());
        let redis_key_prefix = env::var("REDIS_KEY_PREFIX").unwrap_or_default();

        Ok(Settings {
            env,
            log_format,
            server_addr,
            api_prefix,
            cors_allow_origins,
            cors_max_age_seconds,
            request_body_limit_bytes,
            supabase_url,
            supabase_service_role_key,
            supabase_anon_key,
            identity_timeout_seconds,
            supabase_jwt_jwks_url,
            supabase_jwt_issuer,
            supabase_jwt_audience,
            jwks_cache_ttl_seconds,
            profile_store,
            redis_url,
            redis_key_prefix,
        })
    }

    /// Settings for running against in-process collaborators.
    pub fn local(supabase_url: &str) -> Self {
        let supabase_url = supabase_url.trim_end_matches('/').to_string();
        Self {
            env: Environment::Dev,
            log_format: LogFormat::Compact,
            server_addr: "127.0.0.1:0".to_string(),
            api_prefix: "/make-server-0c780f05".to_string(),
            cors_allow_origins: vec!["*".to_string()],
            cors_max_age_seconds: 600,
            request_body_limit_bytes: 64 * 1024,
            supabase_jwt_issuer: format!("{supabase_url}/auth/v1"),
            supabase_url,
            supabase_service_role_key: "service-role-key".to_string(),
            supabase_anon_key: None,
            identity_timeout_seconds: 5,
            supabase_jwt_jwks_url: None,
            supabase_jwt_audience: "authenticated".to_string(),
            jwks_cache_ttl_seconds: 1800,
            profile_store: StoreBackend::Memory,
            redis_url: "redis://127.0.0.1:6379/0".to_string(),
            redis_key_prefix: String::new(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// `""` and `"/"` mean "mount at the root"; anything else gets a leading
/// slash and loses its trailing one.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
