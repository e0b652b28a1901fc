//! API Handlers
//!
//! Bridges axum requests into the dispatcher.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, Uri},
    response::Response,
};

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::models::RequestDescriptor;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Dispatcher::from_config(config))
    }
}

/// Host the request was addressed to: the `Host` header, or the URI
/// authority for absolute-form requests.
fn request_host(uri: &Uri, headers: &HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .or_else(|| uri.authority().map(|authority| authority.as_str().to_owned()))
        .unwrap_or_default()
}

/// Catch-all handler: every method and path goes through the dispatcher.
pub async fn serve_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let host = request_host(&uri, &headers);
    let request = RequestDescriptor::new(method, host, uri.path(), headers);
    state.dispatcher.handle(request).await
}
