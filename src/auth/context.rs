use crate::identity::IdentityUser;

/// Caller identity resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Identity provider user id; also the profile key
    pub user_id: String,
    pub email: Option<String>,
}

impl From<IdentityUser> for Identity {
    fn from(user: IdentityUser) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
        }
    }
}
