use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use meshguard_api::app::{build_app, services};
use meshguard_api::config::GateConfig;
use meshguard_audit::AuditEvent;
use meshguard_events::{EventSink, InMemoryEventBus};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    meshguard_observability::init();

    let config = GateConfig::from_env()?;
    tracing::info!(?config, "starting meshguard-api");

    let sink: Option<Arc<dyn EventSink<AuditEvent>>> = if config.audit_enabled {
        let bus = Arc::new(InMemoryEventBus::new());
        services::spawn_audit_logger(bus.subscribe());
        let sink: Arc<dyn EventSink<AuditEvent>> = bus;
        Some(sink)
    } else {
        tracing::info!("audit logging disabled");
        None
    };

    let app = build_app(&config, sink);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
