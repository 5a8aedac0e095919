//! Proxy module
//!
//! Everything between a resolved target and the bytes sent back:
//! - Outbound header rewriting
//! - The upstream transport seam and its HTTPS implementation
//! - Forwarding and streaming relay of the upstream response

pub mod headers;
pub mod relay;
pub mod upstream;

pub use headers::{rewrite_request_headers, ClientAddr};
pub use relay::{build_outbound_request, forward_and_relay};
pub use upstream::{HttpsUpstream, Upstream};
