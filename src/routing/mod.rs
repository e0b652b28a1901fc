//! Routing Module
//!
//! Resolves a request path within a tenant root, with a fixed fallback
//! order for anything that cannot be served.

mod confine;
mod fallback;

pub use confine::confine;
pub use fallback::{not_found_chain, resolve, FallbackOutcome, INDEX_PAGE, NOT_FOUND_PAGE};
