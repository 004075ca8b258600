//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: in-memory stores and the audit log consumer
//! - `routes/`: HTTP routes + handlers (one file per area)

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use meshguard_audit::{AuditEvent, Auditor};
use meshguard_auth::Hs256TokenValidator;
use meshguard_events::EventSink;

use crate::config::GateConfig;
use crate::guard::Guard;
use crate::middleware::{self, AuthState, PublicRoutes};

pub mod routes;
pub mod services;

/// Shared per-process state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub guard: Guard,
    pub bookings: Arc<services::BookingStore>,
    pub users: Arc<services::UserDirectory>,
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// `sink` receives audit events; pass `None` to disable auditing.
pub fn build_app(config: &GateConfig, sink: Option<Arc<dyn EventSink<AuditEvent>>>) -> Router {
    let validator = Arc::new(Hs256TokenValidator::new(config.jwt_secret.as_bytes()));
    let auth_state = AuthState::new(validator, PublicRoutes::new(config.public_routes.iter().cloned()));

    let auditor = Auditor::new(sink).with_topic(config.audit_topic.clone());
    let state = AppState {
        guard: Guard::new(auditor),
        bookings: Arc::new(services::BookingStore::default()),
        users: Arc::new(services::UserDirectory::seeded()),
    };

    // The gate wraps every route and consults the public-route set itself.
    Router::new()
        .route("/health", get(routes::system::health))
        .route("/actuator/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(state))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ))
        .layer(ServiceBuilder::new())
}
