//! Fallback Resolver
//!
//! Decides what a request is answered with: the resource itself, the
//! tenant's `404.html`, the host-wide `404.html`, a bare 404, or a 500.

use std::io;
use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use tracing::debug;

use super::confine::confine;
use crate::tenant::TenantResolution;

/// Name of the custom not-found page looked up at tenant and base level.
pub const NOT_FOUND_PAGE: &str = "404.html";

/// File served for directory requests.
pub const INDEX_PAGE: &str = "index.html";

// == Fallback Outcome ==
/// What a request resolves to. Computed per request, never cached as such.
#[derive(Debug)]
pub enum FallbackOutcome {
    /// The requested resource.
    Serve(PathBuf),
    /// The tenant's own `404.html`.
    TenantNotFound(PathBuf),
    /// The base directory's `404.html`.
    GlobalNotFound(PathBuf),
    /// Bare protocol-level 404 with no custom body file.
    DefaultNotFound,
    /// A filesystem check failed for a reason other than absence.
    InternalError(io::Error),
}

impl FallbackOutcome {
    /// File whose contents make up the response body, if any.
    pub fn source(&self) -> Option<&Path> {
        match self {
            FallbackOutcome::Serve(path)
            | FallbackOutcome::TenantNotFound(path)
            | FallbackOutcome::GlobalNotFound(path) => Some(path),
            FallbackOutcome::DefaultNotFound | FallbackOutcome::InternalError(_) => None,
        }
    }

    /// Not-found pages that would have been chosen over this outcome had
    /// they existed: the tenant page above the global one, and both above
    /// the bare 404. Creating any of them should replace a cached body.
    pub fn outranking_pages(&self, tenant_dir: Option<&Path>, base: &Path) -> Vec<PathBuf> {
        let tenant_page = tenant_dir.map(|dir| dir.join(NOT_FOUND_PAGE));
        match self {
            FallbackOutcome::GlobalNotFound(_) => tenant_page.into_iter().collect(),
            FallbackOutcome::DefaultNotFound => tenant_page
                .into_iter()
                .chain(std::iter::once(base.join(NOT_FOUND_PAGE)))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            FallbackOutcome::Serve(_) => StatusCode::OK,
            FallbackOutcome::TenantNotFound(_)
            | FallbackOutcome::GlobalNotFound(_)
            | FallbackOutcome::DefaultNotFound => StatusCode::NOT_FOUND,
            FallbackOutcome::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn is_missing(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

// == Not Found Chain ==
/// Three-level not-found fallback shared by the tenant and resource phases:
/// `<tenant>/404.html`, then `<base>/404.html`, then a bare 404.
pub async fn not_found_chain(tenant_dir: Option<&Path>, base: &Path) -> FallbackOutcome {
    if let Some(dir) = tenant_dir {
        let page = dir.join(NOT_FOUND_PAGE);
        if is_file(&page).await {
            return FallbackOutcome::TenantNotFound(page);
        }
    }

    let page = base.join(NOT_FOUND_PAGE);
    if is_file(&page).await {
        return FallbackOutcome::GlobalNotFound(page);
    }

    FallbackOutcome::DefaultNotFound
}

// == Resolve ==
/// Runs the fallback chain for one request.
///
/// Priority, first match wins:
/// 1. Tenant lookup failed → `InternalError`.
/// 2. Tenant missing → not-found chain under `<base>/<domain>`.
/// 3. Resource check failed → `InternalError`.
/// 4. Resource missing, or outside the tenant root → not-found chain under the tenant root.
/// 5. Otherwise → `Serve`.
pub async fn resolve(base: &Path, tenant: TenantResolution, request_path: &str) -> FallbackOutcome {
    let root = match tenant {
        TenantResolution::Error { error, .. } => return FallbackOutcome::InternalError(error),
        TenantResolution::NotFound { domain } => {
            let tenant_dir = domain.map(|d| base.join(d));
            return not_found_chain(tenant_dir.as_deref(), base).await;
        }
        TenantResolution::Found(root) => root,
    };
    let root = root.path();

    let Some(candidate) = confine(root, request_path) else {
        debug!(path = request_path, "Rejected path outside tenant root");
        return not_found_chain(Some(root), base).await;
    };

    match locate(root, candidate).await {
        Ok(Some(file)) => FallbackOutcome::Serve(file),
        Ok(None) => not_found_chain(Some(root), base).await,
        Err(error) => FallbackOutcome::InternalError(error),
    }
}

/// Finds the file to serve for a confined candidate path.
///
/// Directories resolve to their `index.html`. `Ok(None)` means missing,
/// including when symlinks lead the canonical location out of `root`.
async fn locate(root: &Path, candidate: PathBuf) -> io::Result<Option<PathBuf>> {
    let meta = match tokio::fs::metadata(&candidate).await {
        Ok(meta) => meta,
        Err(e) if is_missing(&e) => return Ok(None),
        Err(e) => return Err(e),
    };

    let file = if meta.is_dir() {
        let index = candidate.join(INDEX_PAGE);
        match tokio::fs::metadata(&index).await {
            Ok(meta) if meta.is_file() => index,
            Ok(_) => return Ok(None),
            Err(e) if is_missing(&e) => return Ok(None),
            Err(e) => return Err(e),
        }
    } else {
        candidate
    };

    let canonical_root = tokio::fs::canonicalize(root).await?;
    let canonical_file = match tokio::fs::canonicalize(&file).await {
        Ok(path) => path,
        Err(e) if is_missing(&e) => return Ok(None),
        Err(e) => return Err(e),
    };
    if !canonical_file.starts_with(&canonical_root) {
        debug!(file = %file.display(), "Symlink escapes tenant root");
        return Ok(None);
    }

    Ok(Some(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::TenantResolver;
    use std::fs;
    use tempfile::TempDir;

    async fn run(base: &Path, host: &str, path: &str) -> FallbackOutcome {
        let tenant = TenantResolver::new(base).resolve(host).await;
        resolve(base, tenant, path).await
    }

    #[tokio::test]
    async fn test_serves_existing_resource() {
        let base = TempDir::new().unwrap();
        fs::create_dir(base.path().join("a.com")).unwrap();
        fs::write(base.path().join("a.com/page.html"), "page").unwrap();

        let outcome = run(base.path(), "a.com", "/page.html").await;
        assert!(matches!(outcome, FallbackOutcome::Serve(ref p) if p.ends_with("a.com/page.html")));
        assert_eq!(outcome.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_directory_serves_index() {
        let base = TempDir::new().unwrap();
        fs::create_dir_all(base.path().join("a.com/docs")).unwrap();
        fs::write(base.path().join("a.com/index.html"), "home").unwrap();
        fs::write(base.path().join("a.com/docs/index.html"), "docs").unwrap();

        let outcome = run(base.path(), "a.com", "/").await;
        assert!(matches!(outcome, FallbackOutcome::Serve(ref p) if p.ends_with("a.com/index.html")));

        let outcome = run(base.path(), "a.com", "/docs/").await;
        assert!(matches!(outcome, FallbackOutcome::Serve(ref p) if p.ends_with("docs/index.html")));
    }

    #[tokio::test]
    async fn test_directory_without_index_is_missing() {
        let base = TempDir::new().unwrap();
        fs::create_dir_all(base.path().join("a.com/empty")).unwrap();

        let outcome = run(base.path(), "a.com", "/empty").await;
        assert!(matches!(outcome, FallbackOutcome::DefaultNotFound));
    }

    #[tokio::test]
    async fn test_missing_resource_prefers_tenant_404() {
        let base = TempDir::new().unwrap();
        fs::create_dir(base.path().join("a.com")).unwrap();
        fs::write(base.path().join("a.com/404.html"), "tenant").unwrap();
        fs::write(base.path().join("404.html"), "global").unwrap();

        let outcome = run(base.path(), "a.com", "/nope.html").await;
        assert!(matches!(outcome, FallbackOutcome::TenantNotFound(ref p) if p.ends_with("a.com/404.html")));
    }

    #[tokio::test]
    async fn test_missing_resource_falls_back_to_global_404() {
        let base = TempDir::new().unwrap();
        fs::create_dir(base.path().join("a.com")).unwrap();
        fs::write(base.path().join("404.html"), "global").unwrap();

        let outcome = run(base.path(), "a.com", "/nope.html").await;
        assert!(matches!(outcome, FallbackOutcome::GlobalNotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_resource_without_pages_is_default_404() {
        let base = TempDir::new().unwrap();
        fs::create_dir(base.path().join("a.com")).unwrap();

        let outcome = run(base.path(), "a.com", "/nope.html").await;
        assert!(matches!(outcome, FallbackOutcome::DefaultNotFound));
        assert_eq!(outcome.status(), StatusCode::NOT_FOUND);
        assert!(outcome.source().is_none());
    }

    #[tokio::test]
    async fn test_missing_tenant_uses_global_404() {
        let base = TempDir::new().unwrap();
        fs::write(base.path().join("404.html"), "global").unwrap();

        let outcome = run(base.path(), "ghost.com", "/index.html").await;
        assert!(matches!(outcome, FallbackOutcome::GlobalNotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_tenant_without_pages_is_default_404() {
        let base = TempDir::new().unwrap();

        let outcome = run(base.path(), "ghost.com", "/").await;
        assert!(matches!(outcome, FallbackOutcome::DefaultNotFound));
    }

    #[tokio::test]
    async fn test_traversal_is_not_found() {
        let base = TempDir::new().unwrap();
        fs::create_dir(base.path().join("a.com")).unwrap();
        fs::write(base.path().join("secret.txt"), "secret").unwrap();

        let outcome = run(base.path(), "a.com", "/../secret.txt").await;
        assert!(matches!(outcome, FallbackOutcome::DefaultNotFound));

        let outcome = run(base.path(), "a.com", "/../../etc/passwd").await;
        assert!(matches!(outcome, FallbackOutcome::DefaultNotFound));
    }

    #[tokio::test]
    async fn test_tenant_isolation() {
        let base = TempDir::new().unwrap();
        fs::create_dir(base.path().join("a.com")).unwrap();
        fs::create_dir(base.path().join("b.com")).unwrap();
        fs::write(base.path().join("b.com/only-b.html"), "b").unwrap();

        let outcome = run(base.path(), "a.com", "/only-b.html").await;
        assert!(matches!(outcome, FallbackOutcome::DefaultNotFound));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_is_not_found() {
        let base = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), "secret").unwrap();
        fs::create_dir(base.path().join("a.com")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            base.path().join("a.com/leak.txt"),
        )
        .unwrap();

        let outcome = run(base.path(), "a.com", "/leak.txt").await;
        assert!(matches!(outcome, FallbackOutcome::DefaultNotFound));
    }

    #[tokio::test]
    async fn test_tenant_error_is_internal_error() {
        let base = TempDir::new().unwrap();
        let tenant = TenantResolution::Error {
            domain: "a.com".to_string(),
            error: io::Error::from(io::ErrorKind::PermissionDenied),
        };

        let outcome = resolve(base.path(), tenant, "/").await;
        assert!(matches!(outcome, FallbackOutcome::InternalError(_)));
        assert_eq!(outcome.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_outranking_pages_follow_chain_order() {
        let base = Path::new("/www");
        let tenant = Path::new("/www/a.com");

        let global = FallbackOutcome::GlobalNotFound(base.join(NOT_FOUND_PAGE));
        assert_eq!(
            global.outranking_pages(Some(tenant), base),
            vec![PathBuf::from("/www/a.com/404.html")]
        );

        assert_eq!(
            FallbackOutcome::DefaultNotFound.outranking_pages(Some(tenant), base),
            vec![
                PathBuf::from("/www/a.com/404.html"),
                PathBuf::from("/www/404.html"),
            ]
        );
        assert_eq!(
            FallbackOutcome::DefaultNotFound.outranking_pages(None, base),
            vec![PathBuf::from("/www/404.html")]
        );

        let tenant_page = FallbackOutcome::TenantNotFound(tenant.join(NOT_FOUND_PAGE));
        assert!(tenant_page.outranking_pages(Some(tenant), base).is_empty());
        assert!(FallbackOutcome::Serve(tenant.join("x.html"))
            .outranking_pages(Some(tenant), base)
            .is_empty());
    }
}
