//! Explicit wrapping chain for protected operations.
//!
//! Each operation is registered once as an [`Operation`] carrying its optional
//! [`AuthorizationRule`]. Handlers run their body through [`Guard::run`],
//! which composes, outermost first:
//!
//! 1. a tracing span with entry/exit timing,
//! 2. the audit wrapper (one event per call, including denied calls),
//! 3. the authorization check,
//! 4. the body itself, started only once authorization has passed.

use std::future::Future;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;

use meshguard_audit::{AuditContext, Auditor, Invocation, ResourceRef};
use meshguard_auth::{AuthorizationRule, IdentityContext, OperationArgs, authorize};
use meshguard_core::{AccessError, AccessResult};

use crate::errors::ApiError;

/// Route-table entry for a protected operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    target: &'static str,
    name: &'static str,
    rule: Option<AuthorizationRule>,
}

impl Operation {
    /// `target` names the owning component (`BookingController`), `name` the
    /// operation (`createBooking`); both feed audit classification.
    pub fn new(target: &'static str, name: &'static str) -> Self {
        Self {
            target,
            name,
            rule: None,
        }
    }

    pub fn rule(mut self, rule: AuthorizationRule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn authorization_rule(&self) -> Option<&AuthorizationRule> {
        self.rule.as_ref()
    }
}

/// Per-request inputs to a guarded call.
#[derive(Debug, Clone)]
pub struct Call<'a> {
    identity: &'a IdentityContext,
    client_ip: Option<&'a str>,
    args: OperationArgs,
    resource: Option<ResourceRef>,
}

impl<'a> Call<'a> {
    pub fn new(identity: &'a IdentityContext, client_ip: Option<&'a str>) -> Self {
        Self {
            identity,
            client_ip,
            args: OperationArgs::new(),
            resource: None,
        }
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args = self.args.with(name, value);
        self
    }

    /// Structured argument such as a request body.
    pub fn body<T: Serialize>(mut self, name: impl Into<String>, value: &T) -> Self {
        self.args = self.args.with_serialized(name, value);
        self
    }

    /// Report the resource explicitly instead of relying on argument inspection.
    pub fn resource(mut self, resource: ResourceRef) -> Self {
        self.resource = Some(resource);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Guard {
    auditor: Auditor,
}

impl Guard {
    pub fn new(auditor: Auditor) -> Self {
        Self { auditor }
    }

    pub fn auditor(&self) -> &Auditor {
        &self.auditor
    }

    /// Run `body` as `operation` on behalf of `call`.
    ///
    /// A denial is returned without `body` ever being called.
    pub async fn run<T, F, Fut>(&self, operation: &Operation, call: Call<'_>, body: F) -> Result<T, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AccessResult<T>>,
    {
        let span = tracing::info_span!(
            "operation",
            component = operation.target,
            method = operation.name
        );

        async move {
            tracing::info!("calling operation");
            let started = Instant::now();

            let mut invocation = Invocation::new(operation.target, operation.name, &call.args);
            if let Some(resource) = call.resource.clone() {
                invocation = invocation.with_resource(resource);
            }
            let ctx = AuditContext {
                identity: call.identity,
                ip_address: call.client_ip,
            };

            let guarded = async {
                if let Some(rule) = &operation.rule {
                    match authorize(call.identity, rule, &call.args) {
                        Ok(grant) => tracing::debug!(?grant, "authorization passed"),
                        Err(e) => return Err(AccessError::from(e)),
                    }
                }
                body().await
            };

            let result = self.auditor.observe(ctx, &invocation, guarded).await;

            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &result {
                Ok(_) => tracing::info!(elapsed_ms, "operation completed"),
                Err(e) if e.is_denial() => tracing::warn!(elapsed_ms, error = %e, "operation denied"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "operation failed"),
            }

            result.map_err(ApiError::from)
        }
        .instrument(span)
        .await
    }
}
