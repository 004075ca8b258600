use axum::{Json, http::StatusCode};

use meshguard_auth::IdentityContext;

use crate::context::Identity;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Identity(identity): Identity) -> Json<IdentityContext> {
    Json(identity)
}
