use anyhow::Result;
use std::sync::Arc;

use expense_portal_backend::{
    app,
    config::{self, StoreBackend},
    identity::{IdentityProvider, SupabaseIdentity},
    logging,
    store::{InMemoryKvStore, KvStore, ProfileStore, RedisKvStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let settings = config::Settings::from_env()?;

    logging::init_logging(&settings.env, settings.log_format);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        api_prefix = %settings.api_prefix,
        "Starting expense portal backend"
    );

    let kv: Arc<dyn KvStore> = match settings.profile_store {
        StoreBackend::Redis => {
            Arc::new(RedisKvStore::new(&settings.redis_url, &settings.redis_key_prefix).await?)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory profile store; data is lost on restart");
            Arc::new(InMemoryKvStore::new())
        }
    };
    let profiles = ProfileStore::new(kv);
    match profiles.health_check().await {
        Ok(()) => tracing::info!(backend = profiles.backend_name(), "Profile store ready"),
        Err(e) => tracing::warn!(error = %e, "Profile store health check failed"),
    }

    let identity = SupabaseIdentity::from_settings(&settings)?;

    // Optionally warm the JWKS cache
    if let Some(jwks) = identity.jwks() {
        if let Err(e) = jwks.warm_cache().await {
            tracing::warn!(error = %e, "Failed to warm JWKS cache - will fetch on first request");
        }
    }

    let identity: Arc<dyn IdentityProvider> = Arc::new(identity);
    let state = app::AppState::new(settings.clone(), profiles, identity);

    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
