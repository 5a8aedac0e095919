//! Per-request error taxonomy
//!
//! Every variant is terminal for the request that raised it and maps to a
//! fixed status code. Upstream 4xx/5xx responses are not errors here; they
//! are relayed like any other response.

use hyper::StatusCode;

/// Boxed error type shared by bodies and the upstream transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Bucket segment failed DNS-label validation. No upstream contact was made.
    #[error("Invalid bucket name")]
    InvalidBucket,

    /// The outbound request (or a header on it) could not be constructed.
    #[error("Failed to create request")]
    BuildRequest(#[from] hyper::http::Error),

    /// Network, DNS or TLS failure talking to the storage backend.
    #[error("Proxy error: {}", error_chain(.0.as_ref()))]
    Upstream(BoxError),
}

impl ProxyError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBucket => StatusCode::BAD_REQUEST,
            Self::BuildRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Whether this failure is a server-side fault worth an error log line
    pub const fn is_server_fault(&self) -> bool {
        !matches!(self, Self::InvalidBucket)
    }
}

/// Render an error with its whole `source()` chain, `outer: inner: root`.
///
/// Transport errors from the pooled client wrap the interesting cause
/// (connection refused, DNS failure) a couple of levels down.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.ends_with(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}
