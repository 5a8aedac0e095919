//! Upstream target resolution
//!
//! | Route                 | Host                         | Path              |
//! |-----------------------|------------------------------|-------------------|
//! | root                  | `{region}.{domain}`          | `/`               |
//! | bucket, presigned     | `{region}.{domain}`          | `/{bucket}/{key}` |
//! | bucket, public        | `{bucket}.{region}.{domain}` | `/{key}`          |
//!
//! Presigned requests keep path-style addressing because the signature is
//! bound to the host and path the issuer signed against.

use super::matcher::RouteMatch;

/// Where a request is sent upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    pub host: String,
    pub path: String,
    /// Raw inbound query, forwarded verbatim
    pub query: Option<String>,
}

impl UpstreamTarget {
    /// `https://{host}{path}` without the query string
    pub fn base_url(&self) -> String {
        format!("https://{}{}", self.host, self.path)
    }

    /// Full upstream URL including the forwarded query string
    pub fn url(&self) -> String {
        match self.query.as_deref() {
            Some(q) if !q.is_empty() => format!("{}?{q}", self.base_url()),
            _ => self.base_url(),
        }
    }
}

/// Computes upstream targets for one region
#[derive(Debug, Clone)]
pub struct TargetResolver {
    /// `{region}.{domain}`
    regional_host: String,
}

impl TargetResolver {
    pub fn new(region: &str, domain: &str) -> Self {
        Self {
            regional_host: format!("{region}.{domain}"),
        }
    }

    pub fn resolve(
        &self,
        route: &RouteMatch,
        presigned: bool,
        query: Option<&str>,
    ) -> UpstreamTarget {
        let (host, path) = match route {
            RouteMatch::Root => (self.regional_host.clone(), "/".to_string()),
            RouteMatch::Bucket { bucket, key } if presigned => {
                (self.regional_host.clone(), format!("/{bucket}/{key}"))
            }
            RouteMatch::Bucket { bucket, key } => {
                (format!("{bucket}.{}", self.regional_host), format!("/{key}"))
            }
        };

        UpstreamTarget {
            host,
            path,
            query: query.map(ToString::to_string),
        }
    }
}
