use serde::Serialize;

use meshguard_core::UserId;

use crate::{JwtClaims, Role};

/// Who is making the current request.
///
/// Built once per request by the authentication gate and passed explicitly
/// down the call chain. Either all three fields are present (authenticated)
/// or none are (anonymous); the constructors are the only way to build one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentityContext {
    user_id: Option<UserId>,
    username: Option<String>,
    role: Option<Role>,
}

impl IdentityContext {
    pub fn authenticated(user_id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: Some(user_id),
            username: Some(username.into()),
            role: Some(role),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.role.is_some()
    }
}

impl From<JwtClaims> for IdentityContext {
    fn from(claims: JwtClaims) -> Self {
        Self::authenticated(claims.user_id, claims.sub, claims.role)
    }
}
