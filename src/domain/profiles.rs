//! Profile domain types
//!
//! One profile per identity-provider user, plus one company record per
//! tenant. Stored as camelCase JSON under `user_profile:{id}` and
//! `company:{name}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// User role. Parsing ignores case because older records mix it;
/// serialization is always lowercase.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "employee" => Ok(Self::Employee),
            other => Err(format!(
                "unknown role `{other}`, expected one of admin, manager, employee"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// User profile entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Back-reference only; never validated against an existing profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    pub company_name: String,
    /// Present until the first successful password change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_password: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A profile exactly as it sits in the store.
///
/// Only this service's own writes are guaranteed to match `Profile`. Records
/// from older clients can carry roles outside the known set or miss fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileRecord(Value);

impl ProfileRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    fn text(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// `None` when the stored role is missing or not one we recognise.
    pub fn role(&self) -> Option<Role> {
        self.text("role").and_then(|raw| raw.parse().ok())
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(|role| role.is_admin())
    }

    pub fn company_name(&self) -> Option<&str> {
        self.text("companyName")
    }

    /// Drops the temporary password. Returns whether anything changed.
    pub fn clear_temp_password(&mut self) -> bool {
        self.0
            .as_object_mut()
            .is_some_and(|fields| fields.remove("tempPassword").is_some())
    }
}

/// Company record, one per tenant, keyed by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub admin_id: String,
    pub created_at: DateTime<Utc>,
}
