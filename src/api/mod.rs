//! API Module
//!
//! HTTP surface of the content host. Every method and path reaches the
//! dispatcher through one fallback handler.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::{create_router, with_request_timeout};
