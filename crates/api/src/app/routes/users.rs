use std::sync::LazyLock;

use axum::{
    Extension, Json, Router,
    extract::Path,
    routing::{get, post},
};

use meshguard_auth::AuthorizationRule;

use crate::app::AppState;
use crate::app::services::UserRecord;
use crate::context::{ClientIp, Identity};
use crate::errors::ApiError;
use crate::guard::{Call, Operation};

static GET_USER: LazyLock<Operation> = LazyLock::new(|| {
    Operation::new("UserController", "getUser").rule(AuthorizationRule::ownership("id"))
});

static FIND_BY_USERNAME: LazyLock<Operation> = LazyLock::new(|| {
    Operation::new("UserController", "findByUsername")
        .rule(AuthorizationRule::ownership("username").by_username())
});

static RESTRICT_USER: LazyLock<Operation> = LazyLock::new(|| {
    Operation::new("UserController", "restrictUser").rule(AuthorizationRule::roles(["ADMIN"]))
});

pub fn router() -> Router {
    Router::new()
        .route("/users/:id", get(get_user))
        .route("/users/by-name/:username", get(find_by_username))
        .route("/admin/users/:id/restrict", post(restrict_user))
}

pub async fn get_user(
    Extension(state): Extension<AppState>,
    Identity(identity): Identity,
    ClientIp(ip): ClientIp,
    Path(id): Path<i64>,
) -> Result<Json<UserRecord>, ApiError> {
    let call = Call::new(&identity, ip.as_deref()).arg("id", id);
    let users = state.users.clone();
    let user = state
        .guard
        .run(&GET_USER, call, move || async move { users.get(id) })
        .await?;
    Ok(Json(user))
}

pub async fn find_by_username(
    Extension(state): Extension<AppState>,
    Identity(identity): Identity,
    ClientIp(ip): ClientIp,
    Path(username): Path<String>,
) -> Result<Json<UserRecord>, ApiError> {
    let call = Call::new(&identity, ip.as_deref()).arg("username", username.clone());
    let users = state.users.clone();
    let user = state
        .guard
        .run(&FIND_BY_USERNAME, call, move || async move {
            users.find_by_username(&username)
        })
        .await?;
    Ok(Json(user))
}

pub async fn restrict_user(
    Extension(state): Extension<AppState>,
    Identity(identity): Identity,
    ClientIp(ip): ClientIp,
    Path(id): Path<i64>,
) -> Result<Json<UserRecord>, ApiError> {
    let call = Call::new(&identity, ip.as_deref()).arg("id", id);
    let users = state.users.clone();
    let user = state
        .guard
        .run(&RESTRICT_USER, call, move || async move {
            let user = users.restrict(id)?;
            tracing::info!(user_id = id, "user restricted");
            Ok(user)
        })
        .await?;
    Ok(Json(user))
}
