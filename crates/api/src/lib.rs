//! HTTP surface: authentication gate, guarded operations, and the demo
//! booking service they protect.

pub mod app;
pub mod config;
pub mod context;
pub mod errors;
pub mod guard;
pub mod middleware;
