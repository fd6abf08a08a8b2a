//! HTTP API module.
//!
//! Exposes the project/task endpoints as JSON over an axum router.

mod server;

pub use server::{run, ApiServer, Owner};
