use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

use meshguard_api::config::GateConfig;
use meshguard_audit::{ActionType, AuditEvent, ResourceType};
use meshguard_auth::{JwtClaims, Role};
use meshguard_core::UserId;
use meshguard_events::{EventSink, InMemoryEventBus, Subscription};

const SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    audit: Subscription<AuditEvent>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(GateConfig::new(SECRET)).await
    }

    async fn spawn_with(config: GateConfig) -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let audit = bus.subscribe();
        let sink: Arc<dyn EventSink<AuditEvent>> = bus;

        // Same router as prod, bound to an ephemeral port.
        let app = meshguard_api::app::build_app(&config, Some(sink));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .await
                .unwrap();
        });

        Self {
            base_url,
            audit,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn next_audit_event(&self) -> AuditEvent {
        self.audit
            .recv_timeout(Duration::from_secs(2))
            .expect("no audit event published")
            .into_payload()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, username: &str, user_id: i64, role: &str, ttl: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: username.to_string(),
        user_id: UserId::new(user_id),
        role: Role::new(role.to_string()),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn token(username: &str, user_id: i64, role: &str) -> String {
    mint_jwt(SECRET, username, user_id, role, ChronoDuration::minutes(10))
}

async fn assert_unauthorized(res: reqwest::Response) {
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "error": "Unauthorized", "message": "Invalid or missing JWT token" })
    );
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/health", "/actuator/health"] {
        let res = client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
async fn protected_routes_reject_bad_credentials() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/whoami")).send().await.unwrap();
    assert_unauthorized(res).await;

    let expired = mint_jwt(SECRET, "alice", 7, "USER", ChronoDuration::minutes(-5));
    let res = client.get(srv.url("/whoami")).bearer_auth(expired).send().await.unwrap();
    assert_unauthorized(res).await;

    let forged = mint_jwt("other-secret", "alice", 7, "USER", ChronoDuration::minutes(10));
    let res = client.get(srv.url("/whoami")).bearer_auth(forged).send().await.unwrap();
    assert_unauthorized(res).await;

    let res = client
        .get(srv.url("/whoami"))
        .header("Authorization", "Basic YWxpY2U6cHc=")
        .send()
        .await
        .unwrap();
    assert_unauthorized(res).await;

    let res = client
        .get(srv.url("/whoami"))
        .header("Authorization", "Bearer not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_unauthorized(res).await;
}

#[tokio::test]
async fn whoami_reflects_the_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/whoami"))
        .bearer_auth(token("alice", 7, "USER"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user_id"], 7);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "USER");
}

#[tokio::test]
async fn users_may_only_read_their_own_record() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let alice = token("alice", 7, "USER");

    let res = client.get(srv.url("/users/7")).bearer_auth(&alice).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["username"], "alice");

    let res = client.get(srv.url("/users/8")).bearer_auth(&alice).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Forbidden");
    assert_eq!(
        body["message"],
        "Access denied. You do not have permission to access this resource"
    );

    let admin = token("admin", 1, "ADMIN");
    let res = client.get(srv.url("/users/8")).bearer_auth(&admin).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn username_ownership_compares_names() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let alice = token("alice", 7, "USER");

    let res = client
        .get(srv.url("/users/by-name/alice"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.url("/users/by-name/bob"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn booking_creation_is_audited() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/bookings"))
        .bearer_auth(token("alice", 7, "USER"))
        .header("X-Forwarded-For", "203.0.113.9, 10.0.0.1")
        .json(&json!({ "name": "Room A" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let booking: Value = res.json().await.unwrap();
    assert_eq!(booking["name"], "Room A");

    let event = srv.next_audit_event();
    assert!(event.success);
    assert_eq!(event.user_id, Some(7));
    assert_eq!(event.username.as_deref(), Some("alice"));
    assert_eq!(event.action_type, ActionType::Create);
    assert_eq!(event.resource_type, ResourceType::Booking);
    assert_eq!(event.description, "CREATE BOOKING: Room A");
    assert_eq!(event.ip_address.as_deref(), Some("203.0.113.9"));
}

#[tokio::test]
async fn role_check_ignores_case_but_rejects_other_roles() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/bookings"))
        .bearer_auth(token("carol", 9, "faculty"))
        .json(&json!({ "name": "Lecture Hall" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(srv.url("/bookings"))
        .bearer_auth(token("dave", 10, "STUDENT"))
        .json(&json!({ "name": "Room B" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Access denied. Required role(s): [USER, FACULTY], but user has role: STUDENT"
    );
}

#[tokio::test]
async fn failed_operations_emit_failure_events() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .delete(srv.url("/bookings/404"))
        .bearer_auth(token("alice", 7, "USER"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let event = srv.next_audit_event();
    assert!(!event.success);
    assert_eq!(event.action_type, ActionType::Cancel);
    assert_eq!(event.resource_id, Some(404));
    assert_eq!(event.description, "CANCEL BOOKING (ID: 404)");
    assert_eq!(event.error_message.as_deref(), Some("Booking not found: 404"));
}

#[tokio::test]
async fn admin_only_operations_deny_without_side_effects() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/admin/users/8/restrict"))
        .bearer_auth(token("alice", 7, "USER"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let denied = srv.next_audit_event();
    assert!(!denied.success);
    assert_eq!(denied.action_type, ActionType::ManageUser);

    let admin = token("admin", 1, "ADMIN");
    let res = client.get(srv.url("/users/8")).bearer_auth(&admin).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["restricted"], false);

    let res = client
        .post(srv.url("/admin/users/8/restrict"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["restricted"], true);
}

#[tokio::test]
async fn configured_public_routes_skip_the_gate() {
    let srv = TestServer::spawn_with(GateConfig::new(SECRET).with_public_routes(["/rooms"])).await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/rooms")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let event = srv.next_audit_event();
    assert_eq!(event.user_id, None);
    assert_eq!(event.resource_type, ResourceType::Resource);

    // Not public by default.
    let srv = TestServer::spawn().await;
    let res = client.get(srv.url("/rooms")).send().await.unwrap();
    assert_unauthorized(res).await;
}
