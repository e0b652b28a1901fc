//! Request models for the content host
//!
//! The per-request descriptor handed from the HTTP layer to the dispatcher.

pub mod request;

pub use request::RequestDescriptor;
