//! `meshguard-core`: shared primitives for the access-control layer.
//!
//! This crate has no HTTP, token or transport concerns.

pub mod error;
pub mod id;

pub use error::{AccessError, AccessResult};
pub use id::UserId;
