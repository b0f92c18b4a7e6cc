//! Verification HTTP API
//!
//! JSON endpoints for independent round verification, plus a shared
//! operator console session.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::ApiServer;
