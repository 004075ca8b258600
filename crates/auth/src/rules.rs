//! Access rules attached to protected operations at registration time.

use serde::{Deserialize, Serialize};

use crate::Role;

/// Parameter looked up by ownership rules when none is configured.
pub const DEFAULT_RESOURCE_ID_PARAM: &str = "id";

/// Access rule for a single protected operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthorizationRule {
    Role(RoleRule),
    Ownership(OwnershipRule),
}

/// Caller must hold one of `required_roles` (any authenticated caller when
/// empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRule {
    pub required_roles: Vec<Role>,
    pub admin_bypass: bool,
}

/// Caller must own the resource named by `resource_id_param`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRule {
    pub resource_id_param: String,
    /// Compare against the caller's user id (`true`) or username (`false`).
    pub by_user_id: bool,
    pub admin_bypass: bool,
}

impl AuthorizationRule {
    /// Any of `roles`, with admin bypass.
    pub fn roles<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self::Role(RoleRule {
            required_roles: roles.into_iter().map(Into::into).collect(),
            admin_bypass: true,
        })
    }

    /// Any authenticated caller.
    pub fn authenticated() -> Self {
        Self::Role(RoleRule {
            required_roles: Vec::new(),
            admin_bypass: true,
        })
    }

    /// Ownership by user id of the value in `resource_id_param`, with admin bypass.
    pub fn ownership(resource_id_param: impl Into<String>) -> Self {
        Self::Ownership(OwnershipRule {
            resource_id_param: resource_id_param.into(),
            by_user_id: true,
            admin_bypass: true,
        })
    }

    /// Switch an ownership rule to compare usernames. No-op for role rules.
    pub fn by_username(mut self) -> Self {
        if let Self::Ownership(rule) = &mut self {
            rule.by_user_id = false;
        }
        self
    }

    pub fn without_admin_bypass(mut self) -> Self {
        match &mut self {
            Self::Role(rule) => rule.admin_bypass = false,
            Self::Ownership(rule) => rule.admin_bypass = false,
        }
        self
    }

    pub fn admin_bypass(&self) -> bool {
        match self {
            Self::Role(rule) => rule.admin_bypass,
            Self::Ownership(rule) => rule.admin_bypass,
        }
    }
}

impl Default for OwnershipRule {
    fn default() -> Self {
        Self {
            resource_id_param: DEFAULT_RESOURCE_ID_PARAM.to_string(),
            by_user_id: true,
            admin_bypass: true,
        }
    }
}
