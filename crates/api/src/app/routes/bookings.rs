use std::sync::LazyLock;

use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{delete, post},
};

use meshguard_auth::AuthorizationRule;

use crate::app::AppState;
use crate::app::services::{Booking, CreateBookingRequest};
use crate::context::{ClientIp, Identity};
use crate::errors::ApiError;
use crate::guard::{Call, Operation};

static CREATE_BOOKING: LazyLock<Operation> = LazyLock::new(|| {
    Operation::new("BookingController", "createBooking")
        .rule(AuthorizationRule::roles(["USER", "FACULTY"]))
});

static CANCEL_BOOKING: LazyLock<Operation> = LazyLock::new(|| {
    Operation::new("BookingController", "cancelBooking").rule(AuthorizationRule::authenticated())
});

pub fn router() -> Router {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/:id", delete(cancel_booking))
}

pub async fn create_booking(
    Extension(state): Extension<AppState>,
    Identity(identity): Identity,
    ClientIp(ip): ClientIp,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let call = Call::new(&identity, ip.as_deref()).body("request", &body);
    let bookings = state.bookings.clone();
    let owner = identity.clone();
    let booking = state
        .guard
        .run(&CREATE_BOOKING, call, move || async move {
            bookings.create(&owner, body)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn cancel_booking(
    Extension(state): Extension<AppState>,
    Identity(identity): Identity,
    ClientIp(ip): ClientIp,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, ApiError> {
    let call = Call::new(&identity, ip.as_deref()).arg("id", id);
    let bookings = state.bookings.clone();
    let caller = identity.clone();
    let booking = state
        .guard
        .run(&CANCEL_BOOKING, call, move || async move {
            bookings.cancel(id, &caller)
        })
        .await?;
    Ok(Json(booking))
}
