//! Forward-and-relay
//!
//! The upstream body is handed to hyper untouched, which copies it to the
//! client one frame at a time; at no point is the whole object held in
//! memory. If the client goes away, hyper drops the response body, which
//! drops the upstream body and releases its connection.

use hyper::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use hyper::{Method, Request, Response};

use super::upstream::Upstream;
use crate::error::ProxyError;
use crate::http::{CachePolicy, ProxyBody};
use crate::routing::UpstreamTarget;

/// Build the outbound request: target URL, rewritten headers, inbound body stream
pub fn build_outbound_request(
    method: Method,
    target: &UpstreamTarget,
    headers: HeaderMap,
    body: ProxyBody,
) -> Result<Request<ProxyBody>, ProxyError> {
    let mut request = Request::builder()
        .method(method)
        .uri(target.url())
        .body(body)?;
    *request.headers_mut() = headers;
    Ok(request)
}

/// Send `request` upstream and shape the response for the client
///
/// Status and headers are relayed verbatim. When `cache` is set (bucket
/// routes) it replaces whatever `Cache-Control` upstream sent.
pub async fn forward_and_relay(
    upstream: &dyn Upstream,
    request: Request<ProxyBody>,
    cache: Option<CachePolicy>,
) -> Result<Response<ProxyBody>, ProxyError> {
    let response = upstream.send(request).await.map_err(ProxyError::Upstream)?;

    let (mut parts, body) = response.into_parts();
    if let Some(policy) = cache {
        let value =
            HeaderValue::try_from(policy.to_header_value()).map_err(hyper::http::Error::from)?;
        parts.headers.insert(CACHE_CONTROL, value);
    }

    Ok(Response::from_parts(parts, body))
}
