use axum::{Router, routing::get};

pub mod bookings;
pub mod rooms;
pub mod system;
pub mod users;

/// Router for every endpoint behind the authentication gate.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .merge(rooms::router())
        .merge(users::router())
        .merge(bookings::router())
}
