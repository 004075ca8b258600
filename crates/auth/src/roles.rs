use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier carried in a token and named by role rules.
///
/// Roles stay opaque strings. Comparison against a rule's required roles is
/// case-insensitive; the admin bypass is not (only the exact `ADMIN` role
/// qualifies).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// The role that may bypass checks declared with `admin_bypass`.
    pub const ADMIN: Role = Role(Cow::Borrowed("ADMIN"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.as_str() == Self::ADMIN.as_str()
    }

    /// Case-insensitive role equality.
    pub fn matches(&self, other: &Role) -> bool {
        self.as_str().eq_ignore_ascii_case(other.as_str())
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Role {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_is_exact() {
        assert!(Role::new("ADMIN").is_admin());
        assert!(!Role::new("admin").is_admin());
        assert!(!Role::new("ADMINISTRATOR").is_admin());
    }

    #[test]
    fn matches_ignores_case() {
        assert!(Role::new("faculty").matches(&Role::new("FACULTY")));
        assert!(!Role::new("student").matches(&Role::new("FACULTY")));
    }
}
