//! Key-value persistence for profiles and companies.
//!
//! The store only needs three primitives: point read, point write and a scan
//! over every key sharing a prefix. Values are JSON documents.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

pub mod memory;
pub mod profiles;
pub mod redis;

pub use memory::InMemoryKvStore;
pub use profiles::ProfileStore;
pub use self::redis::RedisKvStore;

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn set(&self, key: &str, value: &Value) -> Result<()>;
    /// Every value whose key starts with `prefix`, in no particular order.
    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>>;
    async fn health_check(&self) -> Result<()>;
    fn backend_name(&self) -> &'static str;
}
