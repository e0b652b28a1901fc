//! Eclaire - A multi-tenant static content host
//!
//! Serves one directory per domain out of a shared base, falls back through
//! tenant and global 404 pages, and caches responses until their files change.

pub mod api;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fingerprint;
pub mod models;
pub mod routing;
pub mod setup;
pub mod tasks;
pub mod tenant;

pub use api::{create_router, with_request_timeout, AppState};
pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{Result, ServeError};
pub use setup::ensure_content_root;
pub use tasks::spawn_stats_reporter;
