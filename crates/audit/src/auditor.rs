//! Audit wrapping for protected operations.

use std::borrow::Cow;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use meshguard_auth::{IdentityContext, OperationArgs};
use meshguard_events::EventSink;

use crate::{ActionType, AuditEvent, ResourceType, describe};

/// Topic audit events are published to unless overridden.
pub const AUDIT_TOPIC: &str = "audit.events";

/// Resource identity an operation reports explicitly.
///
/// Takes precedence over anything found by inspecting the call arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRef {
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl ResourceRef {
    pub fn id(id: i64) -> Self {
        Self {
            id: Some(id),
            name: None,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }
}

/// Request-scoped facts about the caller.
#[derive(Debug, Clone, Copy)]
pub struct AuditContext<'a> {
    pub identity: &'a IdentityContext,
    pub ip_address: Option<&'a str>,
}

/// The call being audited.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    /// Name of the component that owns the operation (e.g. `BookingController`).
    pub target: &'a str,
    /// Operation name (e.g. `createBooking`).
    pub method: &'a str,
    pub args: &'a OperationArgs,
    pub resource: Option<ResourceRef>,
}

impl<'a> Invocation<'a> {
    pub fn new(target: &'a str, method: &'a str, args: &'a OperationArgs) -> Self {
        Self {
            target,
            method,
            args,
            resource: None,
        }
    }

    pub fn with_resource(mut self, resource: ResourceRef) -> Self {
        self.resource = Some(resource);
        self
    }

    fn resource_id(&self) -> Option<i64> {
        self.resource
            .as_ref()
            .and_then(|r| r.id)
            .or_else(|| resource_id_from_args(self.args))
    }

    fn resource_name(&self) -> Option<String> {
        self.resource
            .as_ref()
            .and_then(|r| r.name.clone())
            .or_else(|| resource_name_from_args(self.args))
    }
}

/// First integer argument, else the integer `id` of an object argument.
pub fn resource_id_from_args(args: &OperationArgs) -> Option<i64> {
    args.values()
        .find_map(Value::as_i64)
        .or_else(|| {
            args.values()
                .filter_map(Value::as_object)
                .find_map(|obj| obj.get("id").and_then(Value::as_i64))
        })
}

/// The non-null `name` field of the first object argument carrying one.
pub fn resource_name_from_args(args: &OperationArgs) -> Option<String> {
    args.values()
        .filter_map(Value::as_object)
        .find_map(|obj| match obj.get("name") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        })
}

/// Wraps operations and emits one [`AuditEvent`] per call.
///
/// Without a sink this is a pass-through: nothing is derived or published.
#[derive(Clone)]
pub struct Auditor {
    sink: Option<Arc<dyn EventSink<AuditEvent>>>,
    topic: Cow<'static, str>,
}

impl Auditor {
    pub fn new(sink: Option<Arc<dyn EventSink<AuditEvent>>>) -> Self {
        Self {
            sink,
            topic: Cow::Borrowed(AUDIT_TOPIC),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn with_topic(mut self, topic: impl Into<Cow<'static, str>>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Run `op`, then publish an event describing the call and its outcome.
    ///
    /// The operation's result is returned untouched; publish failures are
    /// logged and dropped.
    pub async fn observe<T, E, F>(
        &self,
        ctx: AuditContext<'_>,
        invocation: &Invocation<'_>,
        op: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let Some(sink) = &self.sink else {
            return op.await;
        };

        let draft = Draft::new(ctx, invocation);
        let result = op.await;

        let event = match &result {
            Ok(_) => draft.finish(None),
            Err(e) => draft.finish(Some(e.to_string())),
        };
        self.emit(sink.as_ref(), event);

        result
    }

    fn emit(&self, sink: &dyn EventSink<AuditEvent>, event: AuditEvent) {
        let action = event.action_type;
        let resource = event.resource_type;
        let resource_id = event.resource_id;

        match sink.publish(&self.topic, event) {
            Ok(()) => tracing::debug!(
                %action,
                %resource,
                ?resource_id,
                "published audit event"
            ),
            Err(e) => tracing::error!(error = %e, "failed to publish audit event"),
        }
    }
}

impl core::fmt::Debug for Auditor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Auditor")
            .field("enabled", &self.is_enabled())
            .field("topic", &self.topic)
            .finish()
    }
}

/// Everything known before the operation runs.
struct Draft {
    user_id: Option<i64>,
    username: Option<String>,
    user_role: Option<String>,
    action_type: ActionType,
    resource_type: ResourceType,
    resource_id: Option<i64>,
    resource_name: Option<String>,
    description: String,
    ip_address: Option<String>,
}

impl Draft {
    fn new(ctx: AuditContext<'_>, invocation: &Invocation<'_>) -> Self {
        let action_type = ActionType::from_method_name(invocation.method);
        let resource_type = ResourceType::from_target_name(invocation.target);
        let resource_id = invocation.resource_id();
        let resource_name = invocation.resource_name();
        let description = describe(
            action_type,
            resource_type,
            resource_name.as_deref(),
            resource_id,
        );

        Self {
            user_id: ctx.identity.user_id().map(|id| id.get()),
            username: ctx.identity.username().map(str::to_string),
            user_role: ctx.identity.role().map(|r| r.as_str().to_string()),
            action_type,
            resource_type,
            resource_id,
            resource_name,
            description,
            ip_address: ctx.ip_address.map(str::to_string),
        }
    }

    fn finish(self, error_message: Option<String>) -> AuditEvent {
        AuditEvent {
            user_id: self.user_id,
            username: self.username,
            user_role: self.user_role,
            action_type: self.action_type,
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            resource_name: self.resource_name,
            description: self.description,
            ip_address: self.ip_address,
            success: error_message.is_none(),
            error_message,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshguard_auth::Role;
    use meshguard_events::{InMemoryEventBus, PublishError};
    use serde_json::json;

    struct FailingSink;

    impl EventSink<AuditEvent> for FailingSink {
        fn publish(&self, _topic: &str, _message: AuditEvent) -> Result<(), PublishError> {
            Err(PublishError::Transport("broker unavailable".to_string()))
        }
    }

    fn alice() -> IdentityContext {
        IdentityContext::authenticated(7i64.into(), "alice", Role::new("USER"))
    }

    fn ctx(identity: &IdentityContext) -> AuditContext<'_> {
        AuditContext {
            identity,
            ip_address: Some("10.0.0.1"),
        }
    }

    fn bus_auditor() -> (Auditor, Arc<InMemoryEventBus<AuditEvent>>) {
        let bus = Arc::new(InMemoryEventBus::new());
        let sink: Arc<dyn EventSink<AuditEvent>> = bus.clone();
        (Auditor::new(Some(sink)), bus)
    }

    #[tokio::test]
    async fn successful_call_emits_a_classified_event() {
        let (auditor, bus) = bus_auditor();
        let sub = bus.subscribe();
        let identity = alice();
        let args = OperationArgs::new().with("request", json!({ "name": "Room A", "slot": 3 }));
        let inv = Invocation::new("BookingController", "createBooking", &args);

        let out: Result<u32, String> = auditor.observe(ctx(&identity), &inv, async { Ok(5) }).await;
        assert_eq!(out, Ok(5));

        let env = sub.try_recv().unwrap();
        assert_eq!(env.topic(), AUDIT_TOPIC);
        let event = env.into_payload();
        assert_eq!(event.action_type, ActionType::Create);
        assert_eq!(event.resource_type, ResourceType::Booking);
        assert_eq!(event.resource_name.as_deref(), Some("Room A"));
        assert_eq!(event.description, "CREATE BOOKING: Room A");
        assert_eq!(event.user_id, Some(7));
        assert_eq!(event.username.as_deref(), Some("alice"));
        assert_eq!(event.user_role.as_deref(), Some("USER"));
        assert_eq!(event.ip_address.as_deref(), Some("10.0.0.1"));
        assert!(event.success);
        assert_eq!(event.error_message, None);
    }

    #[tokio::test]
    async fn failed_call_emits_failure_and_returns_original_error() {
        let (auditor, bus) = bus_auditor();
        let sub = bus.subscribe();
        let identity = alice();
        let args = OperationArgs::new().with("id", 12);
        let inv = Invocation::new("BookingController", "cancelBooking", &args);

        let out: Result<(), String> = auditor
            .observe(ctx(&identity), &inv, async { Err("booking 12 not found".to_string()) })
            .await;
        assert_eq!(out, Err("booking 12 not found".to_string()));

        let event = sub.try_recv().unwrap().into_payload();
        assert!(!event.success);
        assert_eq!(event.error_message.as_deref(), Some("booking 12 not found"));
        assert_eq!(event.action_type, ActionType::Cancel);
        assert_eq!(event.resource_id, Some(12));
        assert_eq!(event.description, "CANCEL BOOKING (ID: 12)");
    }

    #[tokio::test]
    async fn no_sink_is_a_pass_through() {
        let auditor = Auditor::disabled();
        let identity = IdentityContext::anonymous();
        let args = OperationArgs::new();
        let inv = Invocation::new("X", "y", &args);

        let ok: Result<&str, String> = auditor.observe(ctx(&identity), &inv, async { Ok("ran") }).await;
        assert_eq!(ok, Ok("ran"));

        let err: Result<(), String> = auditor
            .observe(ctx(&identity), &inv, async { Err("boom".to_string()) })
            .await;
        assert_eq!(err, Err("boom".to_string()));
    }

    #[tokio::test]
    async fn sink_failure_never_masks_the_outcome() {
        let auditor = Auditor::new(Some(Arc::new(FailingSink)));
        let identity = alice();
        let args = OperationArgs::new();
        let inv = Invocation::new("UserController", "getUser", &args);

        let ok: Result<i32, String> = auditor.observe(ctx(&identity), &inv, async { Ok(1) }).await;
        assert_eq!(ok, Ok(1));

        let err: Result<i32, String> = auditor
            .observe(ctx(&identity), &inv, async { Err("db down".to_string()) })
            .await;
        assert_eq!(err, Err("db down".to_string()));
    }

    #[tokio::test]
    async fn explicit_resource_ref_wins_over_arguments() {
        let (auditor, bus) = bus_auditor();
        let auditor = auditor.with_topic("audit.log");
        let sub = bus.subscribe();
        let identity = alice();
        let args = OperationArgs::new().with("id", 1).with("body", json!({ "name": "ignored" }));
        let inv = Invocation::new("ResourceController", "updateResource", &args)
            .with_resource(ResourceRef { id: Some(99), name: Some("Lab 4".to_string()) });

        let _: Result<(), String> = auditor.observe(ctx(&identity), &inv, async { Ok(()) }).await;

        let env = sub.try_recv().unwrap();
        assert_eq!(env.topic(), "audit.log");
        let event = env.into_payload();
        assert_eq!(event.resource_id, Some(99));
        assert_eq!(event.resource_name.as_deref(), Some("Lab 4"));
        assert_eq!(event.description, "UPDATE RESOURCE: Lab 4");
    }

    #[test]
    fn resource_id_prefers_integer_arguments() {
        let args = OperationArgs::new()
            .with("body", json!({ "id": 4 }))
            .with("limit", "10")
            .with("page", 2);
        assert_eq!(resource_id_from_args(&args), Some(2));

        let args = OperationArgs::new().with("body", json!({ "id": 4 }));
        assert_eq!(resource_id_from_args(&args), Some(4));

        let args = OperationArgs::new().with("body", json!({ "id": "4" })).with("q", "x");
        assert_eq!(resource_id_from_args(&args), None);
    }

    #[test]
    fn resource_name_tolerates_missing_or_null_names() {
        let args = OperationArgs::new()
            .with("a", json!({ "name": null }))
            .with("b", json!({ "title": "x" }));
        assert_eq!(resource_name_from_args(&args), None);

        let args = OperationArgs::new().with("a", json!({ "name": 12 }));
        assert_eq!(resource_name_from_args(&args).as_deref(), Some("12"));
    }

    #[test]
    fn event_serializes_with_camel_case_keys() {
        let draft = Draft::new(
            AuditContext {
                identity: &alice(),
                ip_address: None,
            },
            &Invocation::new("UserController", "restrictUser", &OperationArgs::new().with("id", 3)),
        );
        let json = serde_json::to_value(draft.finish(None)).unwrap();

        assert_eq!(json["actionType"], "MANAGE_USER");
        assert_eq!(json["resourceType"], "USER");
        assert_eq!(json["resourceId"], 3);
        assert_eq!(json["userRole"], "USER");
        assert_eq!(json["success"], true);
        assert!(json["errorMessage"].is_null());
        assert!(json.get("timestamp").is_some());
    }
}
