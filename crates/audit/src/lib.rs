//! `meshguard-audit`: derives audit events from intercepted calls and hands
//! them to an optional event sink.

pub mod auditor;
pub mod classify;
pub mod event;

pub use auditor::{AUDIT_TOPIC, AuditContext, Auditor, Invocation, ResourceRef};
pub use classify::{ActionType, ResourceType, describe};
pub use event::AuditEvent;
