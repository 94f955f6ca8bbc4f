//! Profile and company records over the key-value store.
//!
//! Writes go through the typed `Profile` and `Company`. Reads come back as
//! raw `ProfileRecord`s so that records this service did not write are never
//! dropped or turned into errors.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;

use super::KvStore;
use crate::domain::{Company, Profile, ProfileRecord};

/// Key builders for consistent key formats.
pub mod keys {
    pub const PROFILE_PREFIX: &str = "user_profile:";
    pub const COMPANY_PREFIX: &str = "company:";

    pub fn profile(user_id: &str) -> String {
        format!("{PROFILE_PREFIX}{user_id}")
    }

    pub fn company(name: &str) -> String {
        format!("{COMPANY_PREFIX}{name}")
    }
}

#[derive(Clone)]
pub struct ProfileStore {
    kv: Arc<dyn KvStore>,
}

impl ProfileStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    pub fn backend_name(&self) -> &'static str {
        self.kv.backend_name()
    }

    pub async fn health_check(&self) -> Result<()> {
        self.kv.health_check().await
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<ProfileRecord>> {
        let key = keys::profile(user_id);
        let value = self
            .kv
            .get(&key)
            .await
            .with_context(|| format!("Failed to read {key}"))?;
        Ok(value.map(ProfileRecord::new))
    }

    pub async fn put(&self, profile: &Profile) -> Result<()> {
        self.write(&keys::profile(&profile.id), profile).await
    }

    /// Writes back a record previously returned by `get`, untouched apart
    /// from whatever the caller changed.
    pub async fn put_record(&self, user_id: &str, record: &ProfileRecord) -> Result<()> {
        self.write(&keys::profile(user_id), record).await
    }

    /// Every profile in the store, across all companies, whatever its shape.
    pub async fn list(&self) -> Result<Vec<ProfileRecord>> {
        let values = self
            .kv
            .get_by_prefix(keys::PROFILE_PREFIX)
            .await
            .context("Failed to scan profiles")?;
        Ok(values.into_iter().map(ProfileRecord::new).collect())
    }

    /// Whether any profile anywhere carries the admin role. Not scoped by
    /// company. Only the `role` field is consulted.
    pub async fn admin_exists(&self) -> Result<bool> {
        Ok(self.list().await?.iter().any(ProfileRecord::is_admin))
    }

    /// Whether this user's stored role is admin. A missing record or an
    /// unrecognised role is simply not admin.
    pub async fn is_admin(&self, user_id: &str) -> Result<bool> {
        Ok(self
            .get(user_id)
            .await?
            .is_some_and(|record| record.is_admin()))
    }

    pub async fn put_company(&self, company: &Company) -> Result<()> {
        self.write(&keys::company(&company.name), company).await
    }

    async fn write<T: Serialize>(&self, key: &str, record: &T) -> Result<()> {
        let value = serde_json::to_value(record).context("Failed to serialize record")?;
        self.kv
            .set(key, &value)
            .await
            .with_context(|| format!("Failed to write {key}"))
    }
}
