//! Request descriptor
//!
//! Everything the dispatcher needs to know about one inbound request.

use axum::http::{header, HeaderMap, Method};

/// One inbound request, owned by the dispatcher for the request's lifetime.
///
/// # Fields
/// - `method`: HTTP method
/// - `host`: raw host value, `domain[:port]`
/// - `path`: URL path, still percent-encoded
/// - `headers`: request headers, read-only
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub host: String,
    pub path: String,
    pub headers: HeaderMap,
}

impl RequestDescriptor {
    pub fn new(
        method: Method,
        host: impl Into<String>,
        path: impl Into<String>,
        headers: HeaderMap,
    ) -> Self {
        Self {
            method,
            host: host.into(),
            path: path.into(),
            headers,
        }
    }

    /// Shorthand for a GET with no headers besides the host.
    pub fn get(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(Method::GET, host, path, HeaderMap::new())
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }

    /// Whether the method is one the host serves at all.
    pub fn is_servable(&self) -> bool {
        self.method == Method::GET || self.method == Method::HEAD
    }

    /// Whether `Accept-Encoding` admits a gzip body.
    ///
    /// A request without the header is answered with the identity coding.
    pub fn accepts_gzip(&self) -> bool {
        self.headers
            .get_all(header::ACCEPT_ENCODING)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .any(coding_admits_gzip)
    }
}

/// Parses one `coding[;q=value]` item.
fn coding_admits_gzip(item: &str) -> bool {
    let mut parts = item.split(';');
    let coding = parts.next().unwrap_or("").trim();
    if !(coding.eq_ignore_ascii_case("gzip")
        || coding.eq_ignore_ascii_case("x-gzip")
        || coding == "*")
    {
        return false;
    }

    for param in parts {
        if let Some((name, value)) = param.split_once('=') {
            if name.trim().eq_ignore_ascii_case("q") {
                return value.trim().parse::<f32>().map(|q| q > 0.0).unwrap_or(false);
            }
        }
    }
    true
}
