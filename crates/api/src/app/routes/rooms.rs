use std::sync::LazyLock;

use axum::{Extension, Json, Router, routing::get};
use serde_json::{Value, json};

use crate::app::AppState;
use crate::context::{ClientIp, Identity};
use crate::errors::ApiError;
use crate::guard::{Call, Operation};

static LIST_RESOURCES: LazyLock<Operation> =
    LazyLock::new(|| Operation::new("ResourceController", "listResources"));

pub fn router() -> Router {
    Router::new().route("/rooms", get(list_resources))
}

pub async fn list_resources(
    Extension(state): Extension<AppState>,
    Identity(identity): Identity,
    ClientIp(ip): ClientIp,
) -> Result<Json<Value>, ApiError> {
    let call = Call::new(&identity, ip.as_deref());
    let rooms = state
        .guard
        .run(&LIST_RESOURCES, call, || async {
            Ok(json!({ "items": ["Room A", "Room B", "Lecture Hall"] }))
        })
        .await?;
    Ok(Json(rooms))
}
