//! Action/resource taxonomy for audit events.
//!
//! Both classifiers lowercase their input and walk an ordered keyword table;
//! the first entry with a matching substring wins.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Create,
    Update,
    Delete,
    Login,
    Logout,
    CheckIn,
    Cancel,
    Approve,
    ManageUser,
    View,
    Other,
}

const ACTION_KEYWORDS: &[(ActionType, &[&str])] = &[
    (ActionType::Create, &["create", "register", "add"]),
    (ActionType::Update, &["update", "edit", "modify"]),
    (ActionType::Delete, &["delete", "remove"]),
    (ActionType::Login, &["login", "authenticate"]),
    (ActionType::Logout, &["logout"]),
    (ActionType::CheckIn, &["check"]),
    (ActionType::Cancel, &["cancel"]),
    (ActionType::Approve, &["approve"]),
    (ActionType::ManageUser, &["restrict", "unrestrict"]),
    (ActionType::View, &["get", "list", "find"]),
];

impl ActionType {
    pub fn from_method_name(method: &str) -> Self {
        first_match(method, ACTION_KEYWORDS).unwrap_or(Self::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::CheckIn => "CHECK_IN",
            Self::Cancel => "CANCEL",
            Self::Approve => "APPROVE",
            Self::ManageUser => "MANAGE_USER",
            Self::View => "VIEW",
            Self::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Resource,
    Booking,
    Policy,
    User,
    Notification,
    Auth,
    Other,
}

const RESOURCE_KEYWORDS: &[(ResourceType, &[&str])] = &[
    (ResourceType::Resource, &["resource"]),
    (ResourceType::Booking, &["booking"]),
    (ResourceType::Policy, &["policy"]),
    (ResourceType::User, &["user"]),
    (ResourceType::Notification, &["notification"]),
    (ResourceType::Auth, &["auth", "login"]),
];

impl ResourceType {
    pub fn from_target_name(target: &str) -> Self {
        first_match(target, RESOURCE_KEYWORDS).unwrap_or(Self::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resource => "RESOURCE",
            Self::Booking => "BOOKING",
            Self::Policy => "POLICY",
            Self::User => "USER",
            Self::Notification => "NOTIFICATION",
            Self::Auth => "AUTH",
            Self::Other => "OTHER",
        }
    }
}

impl core::fmt::Display for ActionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn first_match<T: Copy>(name: &str, table: &[(T, &[&str])]) -> Option<T> {
    let lower = name.to_lowercase();
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(value, _)| *value)
}

/// Human-readable summary: `"<ACTION> <RESOURCE>"`, then `": <name>"` if a
/// name is known, otherwise `" (ID: <id>)"` if an id is known.
pub fn describe(
    action: ActionType,
    resource: ResourceType,
    resource_name: Option<&str>,
    resource_id: Option<i64>,
) -> String {
    let mut desc = format!("{action} {resource}");
    if let Some(name) = resource_name {
        desc.push_str(": ");
        desc.push_str(name);
    } else if let Some(id) = resource_id {
        desc.push_str(&format!(" (ID: {id})"));
    }
    desc
}
