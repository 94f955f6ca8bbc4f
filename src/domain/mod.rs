//! Domain types and DTOs
//!
//! Records persisted in the key-value store and the request/response bodies
//! of the provisioning and directory endpoints.

pub mod profiles;
pub mod provisioning;

pub use profiles::{Company, Profile, ProfileRecord, Role};
