//! JWKS cache for local Supabase JWT verification
//!
//! Supports the RSA (RS256) and P-256 (ES256) keys Supabase publishes.
//! Keys are cached per `kid` for the configured TTL; an unknown `kid`
//! triggers at most one refetch per second.

use anyhow::{bail, Context, Result};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::Claims;

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kty")]
enum Jwk {
    #[serde(rename = "RSA")]
    Rsa { kid: String, n: String, e: String },
    #[serde(rename = "EC")]
    Ec {
        kid: String,
        crv: String,
        x: String,
        y: String,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Clone)]
struct CachedKey {
    key: DecodingKey,
    algorithm: Algorithm,
    cached_at: Instant,
}

#[derive(Clone)]
pub struct JwksCache {
    inner: Arc<RwLock<JwksCacheInner>>,
    http: reqwest::Client,
    jwks_url: String,
    issuer: String,
    audience: String,
    ttl: Duration,
}

struct JwksCacheInner {
    keys: HashMap<String, CachedKey>,
    last_fetch: Option<Instant>,
}

impl JwksCache {
    pub fn new(
        http: reqwest::Client,
        jwks_url: String,
        issuer: String,
        audience: String,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            inner: Arc::new(RwLock::new(JwksCacheInner {
                keys: HashMap::new(),
                last_fetch: None,
            })),
            http,
            jwks_url,
            issuer,
            audience,
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Verify a JWT and return its claims
    pub async fn verify_token(&self, token: &str) -> Result<Claims> {
        let header = decode_header(token).context("Invalid JWT header")?;
        let kid = header.kid.context("JWT missing kid header")?;

        let cached = self.get_or_fetch_key(&kid).await?;
        if cached.algorithm != header.alg {
            bail!("JWT alg {:?} does not match key {kid}", header.alg);
        }

        let mut validation = Validation::new(cached.algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let token_data =
            decode::<Claims>(token, &cached.key, &validation).context("JWT validation failed")?;

        Ok(token_data.claims)
    }

    async fn get_or_fetch_key(&self, kid: &str) -> Result<CachedKey> {
        if let Some(cached) = self.fresh_key(kid) {
            return Ok(cached);
        }

        self.refresh_keys().await?;

        self.inner
            .read()
            .keys
            .get(kid)
            .cloned()
            .context("Key not found in JWKS")
    }

    fn fresh_key(&self, kid: &str) -> Option<CachedKey> {
        let cache = self.inner.read();
        cache
            .keys
            .get(kid)
            .filter(|cached| cached.cached_at.elapsed() < self.ttl)
            .cloned()
    }

    async fn refresh_keys(&self) -> Result<()> {
        {
            let cache = self.inner.read();
            if let Some(last) = cache.last_fetch {
                if last.elapsed() < Duration::from_secs(1) {
                    return Ok(());
                }
            }
        }

        tracing::debug!("Fetching JWKS from {}", self.jwks_url);

        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .context("Failed to fetch JWKS")?;

        if !response.status().is_success() {
            bail!("JWKS fetch failed with status: {}", response.status());
        }

        let jwks: JwksResponse = response.json().await.context("Failed to parse JWKS")?;
        let now = Instant::now();

        let mut cache = self.inner.write();
        cache.last_fetch = Some(now);

        for jwk in jwks.keys {
            let (kid, parsed) = match jwk {
                Jwk::Rsa { kid, n, e } => {
                    let key = DecodingKey::from_rsa_components(&n, &e);
                    (kid, key.map(|k| (k, Algorithm::RS256)))
                }
                Jwk::Ec { kid, crv, x, y } if crv == "P-256" => {
                    let key = DecodingKey::from_ec_components(&x, &y);
                    (kid, key.map(|k| (k, Algorithm::ES256)))
                }
                Jwk::Ec { kid, crv, .. } => {
                    tracing::debug!(kid = %kid, crv = %crv, "Skipping unsupported EC curve");
                    continue;
                }
                Jwk::Unsupported => continue,
            };

            match parsed {
                Ok((key, algorithm)) => {
                    cache.keys.insert(
                        kid.clone(),
                        CachedKey {
                            key,
                            algorithm,
                            cached_at: now,
                        },
                    );
                    tracing::debug!("Cached JWKS key: {}", kid);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse JWK {}: {}", kid, e);
                }
            }
        }

        tracing::info!("JWKS cache refreshed with {} keys", cache.keys.len());
        Ok(())
    }

    /// Pre-warm the cache by fetching keys
    pub async fn warm_cache(&self) -> Result<()> {
        self.refresh_keys().await
    }

    pub fn cached_key_count(&self) -> usize {
        self.inner.read().keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cache(url: String) -> JwksCache {
        JwksCache::new(
            reqwest::Client::new(),
            url,
            "https://project.supabase.co/auth/v1".to_string(),
            "authenticated".to_string(),
            60,
        )
    }

    #[tokio::test]
    async fn garbage_token_is_rejected_before_any_fetch() {
        let jwks = cache("http://127.0.0.1:9/jwks".to_string());
        assert!(jwks.verify_token("not-a-jwt").await.is_err());
        assert_eq!(jwks.cached_key_count(), 0);
    }

    #[tokio::test]
    async fn refresh_keeps_supported_keys_only() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "keys": [
                    {
                        "kty": "RSA",
                        "kid": "rsa-1",
                        "alg": "RS256",
                        "n": "sXchDaQebHnPiGvyDOAT4saGEUetSyo9MKLOoWFsueri23bOdgWp4Dy1WlUzewbgBHod5pcM9H95GQRV3JDXboIRROSBigeC5yjU1hGzHHyXss8UDprecbAYxknTcQkhslANGRUZmdTOQ5qTRsLAt6BTYuyvVRdhS8exSZEy_c4gs_7svlJJQ4H9_NxsiIoLwAEk7-Q3UXERGYw_75IDrGA84-lA_-Ct4eTlXHBIY2EaV7t7LjJaynVJCpkv4LKjTTAumiGUIuQhrNhZLuF_RJLqHpM2kgWFLU7-VTdL1VbC2tejvcI2BlMkEpk1BzBZI0KQB0GaDWFLN-aEAw3vRw",
                        "e": "AQAB"
                    },
                    { "kty": "oct", "kid": "hmac-1", "k": "c2VjcmV0" }
                ]
            })))
            .mount(&server)
            .await;

        let jwks = cache(format!("{}/auth/v1/.well-known/jwks.json", server.uri()));
        jwks.warm_cache().await.expect("warm");
        assert_eq!(jwks.cached_key_count(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let jwks = cache(format!("{}/jwks", server.uri()));
        assert!(jwks.warm_cache().await.is_err());
    }
}
