//! Business operations behind the HTTP handlers.

pub mod directory;
pub mod provisioning;
