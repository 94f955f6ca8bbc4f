//! Redis-backed key-value store.
//!
//! Values are stored as JSON strings. Prefix scans walk the keyspace with
//! cursor-based `SCAN MATCH` (never `KEYS`) and fetch values with `MGET`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::KvStore;

const SCAN_BATCH: usize = 500;

/// Redis store with a shared multiplexed connection.
#[derive(Clone)]
pub struct RedisKvStore {
    conn: ConnectionManager,
    namespace: String,
}

impl RedisKvStore {
    /// Connect to Redis. `namespace` is prepended to every key.
    pub async fn new(redis_url: &str, namespace: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        tracing::info!(namespace = namespace, "Redis key-value store connected");

        Ok(Self {
            conn,
            namespace: namespace.to_string(),
        })
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }
}

#[async_trait]
impl KvStore for RedisKvStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut conn = self.conn.clone();

        let raw: Option<String> = conn
            .get(self.full_key(key))
            .await
            .context("Failed to read key")?;

        raw.map(|data| serde_json::from_str(&data).context("Stored value is not valid JSON"))
            .transpose()
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        let mut conn = self.conn.clone();

        let data = serde_json::to_string(value).context("Failed to serialize value")?;
        conn.set::<_, _, ()>(self.full_key(key), data)
            .await
            .context("Failed to write key")?;

        debug!(key = key, "Stored value");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", escape_glob(&self.full_key(prefix)));

        let mut keys: Vec<String> = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .cursor_arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .context("Failed to scan keys")?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once
        keys.sort();
        keys.dedup();

        let mut values = Vec::with_capacity(keys.len());
        for chunk in keys.chunks(SCAN_BATCH) {
            let raw: Vec<Option<String>> = redis::cmd("MGET")
                .arg(chunk)
                .query_async(&mut conn)
                .await
                .context("Failed to read scanned keys")?;

            for (key, data) in chunk.iter().zip(raw) {
                // A key deleted between SCAN and MGET comes back as nil
                let Some(data) = data else { continue };
                match serde_json::from_str(&data) {
                    Ok(value) => values.push(value),
                    Err(e) => warn!(key = %key, error = %e, "Skipping non-JSON value"),
                }
            }
        }

        debug!(prefix = prefix, count = values.len(), "Prefix scan");
        Ok(values)
    }

    async fn health_check(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("Redis health check failed")?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// Escapes Redis glob metacharacters so a prefix matches literally.
fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_glob;

    #[test]
    fn glob_metacharacters_are_escaped() {
        assert_eq!(escape_glob("user_profile:"), "user_profile:");
        assert_eq!(escape_glob("company:A*B?[x]"), "company:A\\*B\\?\\[x\\]");
    }
}
