//! Route classification module
//!
//! Splits a request path into the account root or a bucket plus object key.

use percent_encoding::percent_decode_str;

use super::bucket::BucketName;
use crate::error::ProxyError;

/// Result of classifying a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    /// `/`: the storage account root
    Root,
    /// `/{bucket}/{key...}`
    Bucket {
        bucket: BucketName,
        /// Object key as received (still percent-encoded), one leading `/` removed
        key: String,
    },
}

impl RouteMatch {
    pub const fn is_bucket(&self) -> bool {
        matches!(self, Self::Bucket { .. })
    }
}

/// Classify a raw request path
///
/// The bucket segment is percent-decoded before validation. The key is left
/// in its received encoding so upstream sees exactly the path the client
/// addressed (and, for presigned requests, signed). A bare `/{bucket}` is a
/// bucket route with an empty key.
pub fn classify(path: &str) -> Result<RouteMatch, ProxyError> {
    let Some(rest) = path.strip_prefix('/') else {
        return Err(ProxyError::InvalidBucket);
    };

    if rest.is_empty() {
        return Ok(RouteMatch::Root);
    }

    let (segment, key) = rest.split_once('/').unwrap_or((rest, ""));

    let decoded = percent_decode_str(segment)
        .decode_utf8()
        .map_err(|_| ProxyError::InvalidBucket)?;
    let bucket = BucketName::parse(&decoded)?;

    Ok(RouteMatch::Bucket {
        bucket,
        key: key.to_string(),
    })
}
