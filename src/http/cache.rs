//! HTTP cache control module
//!
//! `Cache-Control` values applied to relayed bucket responses.

/// Cache control policy for a proxied response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Shared caches may store the response for `max_age` seconds
    Public(u64),
    /// Caller-specific content (presigned URLs); nothing may store it
    NoStore,
}

impl CachePolicy {
    /// Pick the policy for a bucket response
    pub const fn for_bucket(presigned: bool, max_age: u64) -> Self {
        if presigned {
            Self::NoStore
        } else {
            Self::Public(max_age)
        }
    }

    /// Convert to Cache-Control header value
    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::NoStore => "private, no-store, no-cache, must-revalidate".to_string(),
        }
    }
}
