//! Cache Entry Module
//!
//! Defines the snapshot of a served response kept between requests.

use std::path::PathBuf;
use std::time::SystemTime;

use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;

// == Cache Entry ==
/// A materialized response plus what is needed to judge its staleness.
///
/// Entries are shared as `Arc<CacheEntry>` once stored and never mutated;
/// a refresh replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Response status
    pub status: StatusCode,
    /// Response headers, including the injected caching headers
    pub headers: HeaderMap,
    /// Response body as stored (gzip-encoded)
    pub body: Bytes,
    /// When the response was materialized
    pub served_at: SystemTime,
    /// Where the request path lives on disk, whether or not it exists
    pub disk_path: Option<PathBuf>,
    /// File the body was read from, if any
    pub source: Option<PathBuf>,
    /// Not-found pages that would replace this body if they appeared
    pub outranking_pages: Vec<PathBuf>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry with no on-disk provenance.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes, served_at: SystemTime) -> Self {
        Self {
            status,
            headers,
            body,
            served_at,
            disk_path: None,
            source: None,
            outranking_pages: Vec::new(),
        }
    }

    /// Records where the request path maps on disk.
    pub fn with_disk_path(mut self, path: Option<PathBuf>) -> Self {
        self.disk_path = path;
        self
    }

    /// Records the file the body was read from.
    pub fn with_source(mut self, path: Option<PathBuf>) -> Self {
        self.source = path;
        self
    }

    /// Records the not-found pages ranked above the one served.
    pub fn with_outranking_pages(mut self, pages: Vec<PathBuf>) -> Self {
        self.outranking_pages = pages;
        self
    }

    // == Is Stale ==
    /// Whether a file modified at `modified` postdates this entry.
    ///
    /// Strictly later only: a write landing within the same timestamp
    /// resolution as the serve goes unnoticed.
    pub fn is_stale(&self, modified: SystemTime) -> bool {
        modified > self.served_at
    }

    /// Distinct on-disk paths whose modification invalidates this entry.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(2 + self.outranking_pages.len());
        let provenance = [&self.disk_path, &self.source].into_iter().flatten();
        for path in provenance.chain(&self.outranking_pages) {
            if !paths.contains(path) {
                paths.push(path.clone());
            }
        }
        paths
    }
}
