//! Routing module
//!
//! Turns an inbound path and query into an upstream target:
//! - Route classification (account root vs. bucket + key)
//! - Bucket name validation before any hostname is built
//! - Presigned-URL detection
//! - Target host / URL resolution

mod bucket;
mod matcher;
mod presign;
mod target;

pub use matcher::classify;
pub use presign::is_presigned;
pub use target::{TargetResolver, UpstreamTarget};
