//! Request handler module
//!
//! Responsible for request routing dispatch: local endpoints first, then
//! the bucket/root proxy rules.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
