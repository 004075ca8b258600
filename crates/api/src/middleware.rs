//! Authentication gate.
//!
//! Runs before routing decisions reach any handler. Public paths pass through
//! untouched; every other request must carry a valid `Bearer` token or is
//! rejected with 401 before downstream code runs.

use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use meshguard_auth::{IdentityContext, JwtClaims, TokenValidator};

use crate::errors::json_error;

/// Health-check paths that never require a token.
pub const BUILTIN_PUBLIC_ROUTES: [&str; 2] = ["/health", "/actuator/health"];

const INVALID_TOKEN: &str = "Invalid or missing JWT token";
const PROCESSING_FAILED: &str = "JWT token processing failed";

/// Paths served without authentication.
///
/// Matching is exact string equality; there is no prefix or pattern support.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicRoutes {
    paths: HashSet<String>,
}

impl PublicRoutes {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        BUILTIN_PUBLIC_ROUTES.contains(&path) || self.paths.contains(path)
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<dyn TokenValidator>,
    pub public_routes: Arc<PublicRoutes>,
}

impl AuthState {
    pub fn new(validator: Arc<dyn TokenValidator>, public_routes: PublicRoutes) -> Self {
        Self {
            validator,
            public_routes: Arc::new(public_routes),
        }
    }
}

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    InvalidToken,
    ProcessingFailed,
}

impl Rejection {
    fn into_response(self) -> Response {
        let message = match self {
            Self::InvalidToken => INVALID_TOKEN,
            Self::ProcessingFailed => PROCESSING_FAILED,
        };
        json_error(StatusCode::UNAUTHORIZED, "Unauthorized", message)
    }
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if state.public_routes.is_public(req.uri().path()) {
        return next.run(req).await;
    }

    let claims = match authenticate(state.validator.as_ref(), req.headers()) {
        Ok(claims) => claims,
        Err(rejection) => {
            tracing::warn!(path = %req.uri().path(), "invalid or missing JWT token");
            return rejection.into_response();
        }
    };

    tracing::debug!(username = %claims.sub, role = %claims.role, "JWT validated");
    req.extensions_mut().insert(IdentityContext::from(claims));

    next.run(req).await
}

/// Extract and verify the bearer token.
///
/// A validator that panics is treated like one that reported an internal
/// failure: the request is rejected, never let through.
fn authenticate(validator: &dyn TokenValidator, headers: &HeaderMap) -> Result<JwtClaims, Rejection> {
    let token = extract_bearer(headers).ok_or(Rejection::InvalidToken)?;

    match catch_unwind(AssertUnwindSafe(|| validator.decode(token, Utc::now()))) {
        Ok(Ok(claims)) => Ok(claims),
        Ok(Err(e)) if e.is_internal() => {
            tracing::error!(error = %e, "error processing JWT token");
            Err(Rejection::ProcessingFailed)
        }
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "JWT rejected");
            Err(Rejection::InvalidToken)
        }
        Err(_) => {
            tracing::error!("token validator panicked");
            Err(Rejection::ProcessingFailed)
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() { None } else { Some(token) }
}
