//! Upstream transport
//!
//! [`Upstream`] is the seam between relay logic and the network. The server
//! uses [`HttpsUpstream`], a pooled hyper client speaking TLS to the storage
//! backend; tests substitute an in-memory implementation.

use async_trait::async_trait;
use hyper::{Request, Response};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::error::BoxError;
use crate::http::{boxed, ProxyBody};

/// Sends one request upstream and returns the response head plus a body stream
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Resolves as soon as response headers arrive; the body is read lazily.
    /// An `Err` is a transport failure. HTTP error statuses are `Ok`.
    async fn send(&self, req: Request<ProxyBody>) -> Result<Response<ProxyBody>, BoxError>;
}

/// Pooled HTTPS client used in production
///
/// Cloning shares the connection pool.
#[derive(Clone)]
pub struct HttpsUpstream {
    client: Client<HttpsConnector<HttpConnector>, ProxyBody>,
}

impl HttpsUpstream {
    pub fn new() -> Self {
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_only()
            .enable_http1()
            .build();

        // The outbound Host header is always set by the rewriter
        let client = Client::builder(TokioExecutor::new())
            .set_host(false)
            .build(https);

        Self { client }
    }
}

impl Default for HttpsUpstream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Upstream for HttpsUpstream {
    async fn send(&self, req: Request<ProxyBody>) -> Result<Response<ProxyBody>, BoxError> {
        let response = self.client.request(req).await?;
        Ok(response.map(boxed))
    }
}
