//! In-memory key-value store.
//!
//! Not durable: all state is lost on restart. Used for local development and
//! tests. Reads take a shared lock, writes an exclusive one.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::KvStore;

#[derive(Debug, Clone, Default)]
pub struct InMemoryKvStore {
    entries: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>> {
        // BTreeMap keeps keys sorted, so the prefix is one contiguous range.
        let entries = self.entries.read().await;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(_, value)| value.clone())
            .collect())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn get_and_set_round_trip() {
        let store = InMemoryKvStore::new();
        assert!(store.get("missing").await.unwrap().is_none());

        store.set("user_profile:1", &json!({"id": "1"})).await.unwrap();
        assert_eq!(
            store.get("user_profile:1").await.unwrap(),
            Some(json!({"id": "1"}))
        );

        store.set("user_profile:1", &json!({"id": "1", "x": true})).await.unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn prefix_scan_only_returns_matching_keys() {
        let store = InMemoryKvStore::new();
        store.set("company:Acme", &json!({"name": "Acme"})).await.unwrap();
        store.set("user_profile:a", &json!({"id": "a"})).await.unwrap();
        store.set("user_profile:b", &json!({"id": "b"})).await.unwrap();
        store.set("user_profilez", &json!({"id": "z"})).await.unwrap();

        let mut ids: Vec<String> = store
            .get_by_prefix("user_profile:")
            .await
            .unwrap()
            .into_iter()
            .map(|v| v["id"].as_str().unwrap().to_string())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);

        assert!(store.get_by_prefix("nothing:").await.unwrap().is_empty());
    }
}
