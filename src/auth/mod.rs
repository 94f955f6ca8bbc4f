pub mod claims;
pub mod context;
pub mod jwks;
pub mod middleware;

pub use claims::Claims;
pub use context::Identity;
pub use jwks::JwksCache;
pub use middleware::{resolve_admin, resolve_user, AccessDecision, RequireAdmin, RequireUser};
