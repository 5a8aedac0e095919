//! Bucket name validation
//!
//! Bucket names end up as the first label of the upstream hostname, so they
//! are checked against a DNS-label pattern before anything else sees them.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ProxyError;

static BUCKET_NAME: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([a-z0-9-]{1,61}[a-z0-9])?$"));

/// A bucket name that is safe to splice into a hostname
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketName(String);

impl BucketName {
    pub fn parse(candidate: &str) -> Result<Self, ProxyError> {
        match &*BUCKET_NAME {
            Ok(pattern) if pattern.is_match(candidate) => Ok(Self(candidate.to_string())),
            _ => Err(ProxyError::InvalidBucket),
        }
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
