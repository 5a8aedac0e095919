//! HTTP protocol layer module
//!
//! Body types, response builders and cache policy, decoupled from routing.

pub mod cache;
pub mod response;

pub use cache::CachePolicy;
pub use response::{
    boxed, build_empty_response, build_error_response, build_health_response, ProxyBody,
};
