use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ActionType, ResourceType};

/// Who did what to which resource, and how it ended.
///
/// Built once per intercepted call and handed to the sink as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub user_role: Option<String>,
    pub action_type: ActionType,
    pub resource_type: ResourceType,
    pub resource_id: Option<i64>,
    pub resource_name: Option<String>,
    pub description: String,
    pub ip_address: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}
