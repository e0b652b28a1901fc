//! Tenant Resolver Module
//!
//! Maps a request's host header to the content root of the domain it names.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

// == Tenant Root ==
/// Content directory of one served domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantRoot {
    domain: String,
    path: PathBuf,
}

impl TenantRoot {
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// == Tenant Resolution ==
/// Outcome of looking up a host under the content base directory.
#[derive(Debug)]
pub enum TenantResolution {
    /// A directory named after the domain exists.
    Found(TenantRoot),
    /// No such directory. `domain` is `None` when the host could never name
    /// a directory (empty, `..`, contains a separator).
    NotFound { domain: Option<String> },
    /// The existence check itself failed.
    Error { domain: String, error: io::Error },
}

/// Strips a trailing `:port` from a host header, splitting on the first colon.
pub fn split_domain_from_port(host: &str) -> &str {
    match host.split_once(':') {
        Some((domain, _port)) => domain,
        None => host,
    }
}

/// Whether a domain can be used as a single directory name under the base.
fn is_plain_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain != "."
        && domain != ".."
        && !domain.contains(['/', '\\', '\0'])
}

// == Tenant Resolver ==
/// Resolves hosts to tenant roots under a content base directory.
#[derive(Debug, Clone)]
pub struct TenantResolver {
    base: PathBuf,
}

impl TenantResolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Content base directory.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolves a raw host header (`domain[:port]`).
    pub async fn resolve(&self, host_header: &str) -> TenantResolution {
        let domain = split_domain_from_port(host_header);
        if !is_plain_domain(domain) {
            debug!(host = host_header, "Host cannot name a tenant directory");
            return TenantResolution::NotFound { domain: None };
        }

        let path = self.base.join(domain);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => TenantResolution::Found(TenantRoot {
                domain: domain.to_string(),
                path,
            }),
            Ok(_) => TenantResolution::NotFound {
                domain: Some(domain.to_string()),
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => TenantResolution::NotFound {
                domain: Some(domain.to_string()),
            },
            Err(error) => TenantResolution::Error {
                domain: domain.to_string(),
                error,
            },
        }
    }
}
