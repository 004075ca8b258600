use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use meshguard_core::{AccessError, UserId};

use crate::{AuthorizationRule, IdentityContext, OperationArgs, OwnershipRule, RoleRule};

pub const AUTHENTICATION_REQUIRED: &str = "Authentication required";
pub const RESOURCE_ID_NOT_FOUND: &str = "Resource ID not found";
pub const NOT_RESOURCE_OWNER: &str =
    "Access denied. You do not have permission to access this resource";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),
}

impl From<AuthzError> for AccessError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Unauthenticated(msg) => AccessError::Unauthenticated(msg),
            AuthzError::Forbidden(msg) => AccessError::Forbidden(msg),
        }
    }
}

/// Why a call was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
    /// Caller is `ADMIN` and the rule allows admins through.
    AdminBypass,
    /// The rule names no roles; any authenticated caller passes.
    Authenticated,
    RoleMatched,
    Owner,
}

/// Decide whether `identity` may run an operation guarded by `rule`.
///
/// - No IO
/// - No panics
/// - `args` are only consulted by ownership rules
pub fn authorize(
    identity: &IdentityContext,
    rule: &AuthorizationRule,
    args: &OperationArgs,
) -> Result<Grant, AuthzError> {
    match rule {
        AuthorizationRule::Role(rule) => check_role(identity, rule),
        AuthorizationRule::Ownership(rule) => check_ownership(identity, rule, args),
    }
}

pub fn check_role(identity: &IdentityContext, rule: &RoleRule) -> Result<Grant, AuthzError> {
    let Some(role) = identity.role() else {
        return Err(AuthzError::Unauthenticated(AUTHENTICATION_REQUIRED.to_string()));
    };

    if rule.admin_bypass && role.is_admin() {
        tracing::debug!("admin bypass for role check");
        return Ok(Grant::AdminBypass);
    }

    if rule.required_roles.is_empty() {
        return Ok(Grant::Authenticated);
    }

    let required: HashSet<String> = rule
        .required_roles
        .iter()
        .map(|r| r.as_str().to_uppercase())
        .collect();

    if required.contains(&role.as_str().to_uppercase()) {
        tracing::debug!(role = %role, "role authorization passed");
        Ok(Grant::RoleMatched)
    } else {
        let listed: Vec<&str> = rule.required_roles.iter().map(|r| r.as_str()).collect();
        Err(AuthzError::Forbidden(format!(
            "Access denied. Required role(s): [{}], but user has role: {}",
            listed.join(", "),
            role
        )))
    }
}

pub fn check_ownership(
    identity: &IdentityContext,
    rule: &OwnershipRule,
    args: &OperationArgs,
) -> Result<Grant, AuthzError> {
    let (Some(role), Some(user_id)) = (identity.role(), identity.user_id()) else {
        return Err(AuthzError::Unauthenticated(AUTHENTICATION_REQUIRED.to_string()));
    };

    if rule.admin_bypass && role.is_admin() {
        tracing::debug!("admin bypass for ownership check");
        return Ok(Grant::AdminBypass);
    }

    let Some(resource) = args.resource_id(&rule.resource_id_param) else {
        tracing::warn!(
            param = %rule.resource_id_param,
            "could not resolve resource id for ownership check"
        );
        return Err(AuthzError::Forbidden(RESOURCE_ID_NOT_FOUND.to_string()));
    };

    let owns = if rule.by_user_id {
        owned_by_user_id(resource, user_id)
    } else {
        identity
            .username()
            .is_some_and(|username| owned_by_username(resource, username))
    };

    if owns {
        tracing::debug!(user_id = %user_id, "ownership authorization passed");
        Ok(Grant::Owner)
    } else {
        Err(AuthzError::Forbidden(NOT_RESOURCE_OWNER.to_string()))
    }
}

fn owned_by_user_id(resource: &Value, user_id: UserId) -> bool {
    match resource {
        Value::Number(n) => n.as_i64() == Some(user_id.get()),
        Value::String(s) => match s.parse::<UserId>() {
            Ok(owner) => owner == user_id,
            Err(_) => {
                tracing::error!(resource_id = %s, "invalid user id format for ownership check");
                false
            }
        },
        _ => false,
    }
}

fn owned_by_username(resource: &Value, username: &str) -> bool {
    match resource {
        Value::String(s) => s == username,
        Value::Number(n) => n.to_string() == username,
        _ => false,
    }
}
