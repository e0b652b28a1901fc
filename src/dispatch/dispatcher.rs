//! Request Dispatcher
//!
//! Per request: fingerprint, drop the cached entry if its files changed,
//! serve a hit, or resolve and materialize a miss and store it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use axum::response::{IntoResponse, Response};
use tracing::{debug, instrument};

use super::materialize::materialize;
use super::response::respond;
use super::single_flight::FillGates;
use crate::cache::{mutex_lock, CacheEntry, CacheStore, SharedCache};
use crate::config::Config;
use crate::error::{Result, ServeError};
use crate::fingerprint::{fingerprint, Fingerprint};
use crate::models::RequestDescriptor;
use crate::routing::{self, confine, FallbackOutcome};
use crate::tenant::{split_domain_from_port, TenantResolution, TenantResolver};

// == Dispatcher ==
/// Serves requests from the content tree through the response cache.
#[derive(Debug)]
pub struct Dispatcher {
    resolver: TenantResolver,
    cache: SharedCache,
    gates: FillGates,
    host_scoped: bool,
}

impl Dispatcher {
    /// Creates a dispatcher over `content_dir` using an existing cache.
    pub fn new(content_dir: impl Into<PathBuf>, cache: SharedCache, host_scoped: bool) -> Self {
        Self {
            resolver: TenantResolver::new(content_dir),
            cache,
            gates: FillGates::new(),
            host_scoped,
        }
    }

    /// Creates a dispatcher with a fresh cache from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.content_dir.clone(),
            CacheStore::shared(),
            config.host_scoped_cache,
        )
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Cache key for a request.
    pub fn fingerprint_for(&self, request: &RequestDescriptor) -> Fingerprint {
        if self.host_scoped {
            Fingerprint::scoped(split_domain_from_port(&request.host), &request.path)
        } else {
            fingerprint(&request.path)
        }
    }

    // == Handle ==
    /// Answers one request. Every failure ends in a single 404/405/500.
    pub async fn handle(&self, request: RequestDescriptor) -> Response {
        match self.dispatch(&request).await {
            Ok(entry) => respond(&entry, &request),
            Err(error) => error.into_response(),
        }
    }

    // == Dispatch ==
    /// Returns the cached or freshly materialized snapshot for `request`.
    ///
    /// Errors are never cached.
    #[instrument(skip_all, fields(host = %request.host, path = %request.path))]
    pub async fn dispatch(&self, request: &RequestDescriptor) -> Result<Arc<CacheEntry>> {
        if !request.is_servable() {
            return Err(ServeError::MethodNotAllowed(request.method.to_string()));
        }

        let fp = self.fingerprint_for(request);

        let cached = mutex_lock(&self.cache, "peek").peek(&fp);
        if let Some(entry) = cached {
            self.invalidate_if_stale(&fp, &entry).await;
        }

        let hit = mutex_lock(&self.cache, "lookup").lookup(&fp);
        if let Some(entry) = hit {
            debug!(fingerprint = %fp, outcome = "hit", "Serving cached response");
            return Ok(entry);
        }

        let _permit = self.gates.acquire(fp).await;

        // Filled by a concurrent request while this one waited.
        let filled = mutex_lock(&self.cache, "recheck").peek(&fp);
        if let Some(entry) = filled {
            debug!(fingerprint = %fp, outcome = "coalesced", "Serving response filled concurrently");
            return Ok(entry);
        }

        debug!(fingerprint = %fp, outcome = "miss", "Materializing response");
        let entry = self.fetch(request).await?;
        Ok(mutex_lock(&self.cache, "store").store(fp, entry))
    }

    /// Checks each file the entry depends on and drops the entry if any of
    /// them changed after it was served. Metadata is read outside the lock.
    async fn invalidate_if_stale(&self, fp: &Fingerprint, entry: &CacheEntry) {
        for path in entry.watched_paths() {
            let modified = match tokio::fs::metadata(&path).await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(_) => continue,
            };
            if mutex_lock(&self.cache, "invalidate").invalidate_if_modified(fp, modified) {
                debug!(fingerprint = %fp, file = %path.display(), "Cached response is stale");
                return;
            }
        }
    }

    /// Resolves and materializes a response without consulting the cache.
    async fn fetch(&self, request: &RequestDescriptor) -> Result<CacheEntry> {
        let served_at = SystemTime::now();
        let base = self.resolver.base();

        let tenant = self.resolver.resolve(&request.host).await;
        let tenant_dir = match &tenant {
            TenantResolution::Found(root) => Some(root.path().to_path_buf()),
            TenantResolution::NotFound { domain } => domain.as_ref().map(|d| base.join(d)),
            TenantResolution::Error { .. } => None,
        };
        let disk_path = tenant_dir
            .as_deref()
            .and_then(|dir| confine(dir, &request.path));

        let outcome = routing::resolve(base, tenant, &request.path).await;
        let entry = settle(outcome, tenant_dir.as_deref(), base, served_at).await?;
        Ok(entry.with_disk_path(disk_path))
    }
}

/// Materializes `outcome`. A resource that disappears between resolution
/// and the read is answered through the not-found chain instead.
async fn settle(
    outcome: FallbackOutcome,
    tenant_dir: Option<&Path>,
    base: &Path,
    served_at: SystemTime,
) -> Result<CacheEntry> {
    let is_resource = matches!(outcome, FallbackOutcome::Serve(_));
    match materialize_tracked(outcome, tenant_dir, base, served_at).await {
        Err(ServeError::NotFound(file)) if is_resource => {
            debug!(file = %file, "Resource vanished before read");
            let outcome = routing::not_found_chain(tenant_dir, base).await;
            materialize_tracked(outcome, tenant_dir, base, served_at).await
        }
        result => result,
    }
}

/// Materializes `outcome` and records the files its freshness depends on.
async fn materialize_tracked(
    outcome: FallbackOutcome,
    tenant_dir: Option<&Path>,
    base: &Path,
    served_at: SystemTime,
) -> Result<CacheEntry> {
    let source = outcome.source().map(Path::to_path_buf);
    let outranking = outcome.outranking_pages(tenant_dir, base);
    let entry = materialize(outcome, served_at).await?;
    Ok(entry.with_source(source).with_outranking_pages(outranking))
}
