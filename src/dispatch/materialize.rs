//! Materialization
//!
//! Turns a fallback outcome into a cacheable response snapshot.

use std::io::{self, Read, Write};
use std::path::Path;
use std::time::SystemTime;

use axum::http::{header, HeaderMap, HeaderValue};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::cache::CacheEntry;
use crate::error::{Result, ServeError, NOT_FOUND_BODY};
use crate::routing::FallbackOutcome;

pub const CACHE_CONTROL: &str = "public, max-age=86400";
pub const VARY: &str = "Accept-Encoding";
pub const CONTENT_ENCODING: &str = "gzip";

const HTML: &str = "text/html; charset=utf-8";
const PLAIN: &str = "text/plain; charset=utf-8";

/// Formats a timestamp as an HTTP date (IMF-fixdate).
pub fn http_date(at: SystemTime) -> String {
    DateTime::<Utc>::from(at)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Compresses a body for storage.
pub fn gzip(body: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(body.len() / 2 + 64), Compression::default());
    encoder.write_all(body)?;
    encoder.finish()
}

/// Restores a stored body for clients that do not accept gzip.
pub fn gunzip(body: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(body.len() * 2);
    GzDecoder::new(body).read_to_end(&mut out)?;
    Ok(out)
}

async fn read_source(path: &Path) -> Result<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(raw) => Ok(raw),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ServeError::NotFound(path.display().to_string()))
        }
        Err(e) => Err(ServeError::Io(e)),
    }
}

/// Headers every materialized response carries.
fn baseline_headers(content_type: &str, served_at: SystemTime) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let value = |v: &str| {
        HeaderValue::from_str(v).map_err(|e| ServeError::Internal(format!("bad header value: {}", e)))
    };

    headers.insert(header::CONTENT_TYPE, value(content_type)?);
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
    headers.insert(header::VARY, HeaderValue::from_static(VARY));
    headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static(CONTENT_ENCODING));
    headers.insert(header::LAST_MODIFIED, value(&http_date(served_at))?);
    Ok(headers)
}

// == Materialize ==
/// Reads and encodes the body an outcome stands for.
///
/// `InternalError` outcomes and read failures come back as errors so they
/// never reach the cache. A file that vanished between resolution and read
/// yields `NotFound`.
pub async fn materialize(outcome: FallbackOutcome, served_at: SystemTime) -> Result<CacheEntry> {
    let status = outcome.status();

    let (raw, content_type) = match outcome {
        FallbackOutcome::InternalError(error) => return Err(ServeError::Io(error)),
        FallbackOutcome::DefaultNotFound => (NOT_FOUND_BODY.as_bytes().to_vec(), PLAIN.to_string()),
        FallbackOutcome::Serve(path) => {
            let content_type = mime_guess::from_path(&path)
                .first_or_octet_stream()
                .essence_str()
                .to_string();
            (read_source(&path).await?, content_type)
        }
        FallbackOutcome::TenantNotFound(path) | FallbackOutcome::GlobalNotFound(path) => {
            (read_source(&path).await?, HTML.to_string())
        }
    };

    let body = tokio::task::spawn_blocking(move || gzip(&raw))
        .await
        .map_err(|e| ServeError::Internal(format!("compression task failed: {}", e)))??;

    let headers = baseline_headers(&content_type, served_at)?;
    Ok(CacheEntry::new(status, headers, Bytes::from(body), served_at))
}
