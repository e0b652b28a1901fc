//! Dispatch Module
//!
//! Orchestrates fingerprinting, cache consultation, tenant and fallback
//! resolution, and response emission for each request.

mod dispatcher;
pub mod materialize;
mod response;
mod single_flight;

pub use dispatcher::Dispatcher;
pub use materialize::materialize;
pub use response::respond;
pub use single_flight::{FillGates, FillPermit};
