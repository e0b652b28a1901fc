//! Emits cached snapshots as HTTP responses.

use axum::{
    body::Body,
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use super::materialize::gunzip;
use crate::cache::CacheEntry;
use crate::error::ServeError;
use crate::models::RequestDescriptor;

/// Builds the response for `request` from a stored entry.
///
/// Clients that do not accept gzip get the decoded body and no
/// `Content-Encoding`. HEAD requests get the headers only.
pub fn respond(entry: &CacheEntry, request: &RequestDescriptor) -> Response {
    let mut headers = entry.headers.clone();

    let body = if request.accepts_gzip() {
        entry.body.clone()
    } else {
        match gunzip(&entry.body) {
            Ok(plain) => {
                headers.remove(header::CONTENT_ENCODING);
                Bytes::from(plain)
            }
            Err(e) => return ServeError::Internal(format!("stored body is not gzip: {}", e)).into_response(),
        }
    };

    let body = if request.is_head() {
        headers.insert(header::CONTENT_LENGTH, body.len().into());
        Body::empty()
    } else {
        Body::from(body)
    };

    let mut response = Response::new(body);
    *response.status_mut() = entry.status;
    *response.headers_mut() = headers;
    response
}
