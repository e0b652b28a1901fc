//! Content Directory Bootstrap
//!
//! Seeds a missing content base with a landing page and a generic 404 page
//! so a fresh install answers requests out of the box.

use std::io;
use std::path::Path;

use tracing::info;

use crate::routing::{INDEX_PAGE, NOT_FOUND_PAGE};

pub const WELCOME_PAGE: &str = "<html><body><h1>Eclaire is working!</h1></body></html>";
pub const GENERIC_NOT_FOUND_PAGE: &str =
    "<html><body><h1>404</h1><h4>call the cops</h4></body></html>";

/// Creates `base` with starter pages if it does not exist yet.
///
/// An existing base is left untouched, even when its pages are missing.
/// Returns true if the directory was created.
pub async fn ensure_content_root(base: &Path) -> io::Result<bool> {
    if tokio::fs::try_exists(base).await? {
        return Ok(false);
    }

    tokio::fs::create_dir_all(base).await?;
    tokio::fs::write(base.join(INDEX_PAGE), WELCOME_PAGE).await?;
    tokio::fs::write(base.join(NOT_FOUND_PAGE), GENERIC_NOT_FOUND_PAGE).await?;

    info!(path = %base.display(), "Created content directory with starter pages");
    Ok(true)
}
