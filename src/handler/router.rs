//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: static endpoints, route
//! classification, target resolution, header rewriting and relay.

use crate::config::AppState;
use crate::error::{BoxError, ProxyError};
use crate::http::{self, CachePolicy, ProxyBody};
use crate::logger::{self, AccessLogEntry};
use crate::proxy::{self, ClientAddr};
use crate::routing;
use bytes::Bytes;
use hyper::body::Body;
use hyper::header::{HeaderName, HeaderValue, CONTENT_LENGTH, HOST, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub parts: &'a Parts,
    pub client: ClientAddr<'a>,
    /// Set once a target has been resolved
    pub upstream_host: Option<String>,
}

/// Main entry point for HTTP request handling
///
/// Never fails at the service level: every error becomes a response.
pub async fn handle_request<B>(
    req: Request<B>,
    remote_addr: &str,
    state: Arc<AppState>,
) -> Result<Response<ProxyBody>, Infallible>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();

    let mut ctx = RequestContext {
        parts: &parts,
        client: ClientAddr {
            remote_addr,
            trust_forwarded: state.config.upstream.trust_forwarded_headers,
        },
        upstream_host: None,
    };

    let response = route_request(&mut ctx, http::boxed(body), &state).await;

    if state.config.logging.access_log {
        log_access(&ctx, &response, started, &state);
    }

    Ok(response)
}

/// Route request to a static endpoint or the proxy
async fn route_request(
    ctx: &mut RequestContext<'_>,
    body: ProxyBody,
    state: &AppState,
) -> Response<ProxyBody> {
    let parts = ctx.parts;
    let path = parts.uri.path();

    // 1. Static endpoints (GET only; other methods fall through to the proxy rules)
    if parts.method == Method::GET {
        if path == state.config.routes.favicon_path {
            return http::build_empty_response(StatusCode::NO_CONTENT);
        }
        if path == state.config.routes.health_path {
            return http::build_health_response("OK");
        }
    }

    // 2. Proxy
    match proxy_request(ctx, body, state).await {
        Ok(response) => response,
        Err(err) => {
            if err.is_server_fault() {
                match &err {
                    ProxyError::BuildRequest(source) => {
                        logger::log_error(&format!("{err}: {source}"));
                    }
                    _ => logger::log_error(&err.to_string()),
                }
            } else {
                logger::log_warning(&format!("{err}: {path}"));
            }
            http::build_error_response(&err)
        }
    }
}

/// Classify, resolve, rewrite and forward one request
async fn proxy_request(
    ctx: &mut RequestContext<'_>,
    body: ProxyBody,
    state: &AppState,
) -> Result<Response<ProxyBody>, ProxyError> {
    let parts = ctx.parts;
    let route = routing::classify(parts.uri.path())?;
    let query = parts.uri.query();
    let presigned = route.is_bucket() && routing::is_presigned(query);

    let target = state.resolver.resolve(&route, presigned, query);
    logger::log_target(&target, route.is_bucket(), presigned);
    ctx.upstream_host = Some(target.host.clone());

    let headers = proxy::rewrite_request_headers(
        &parts.headers,
        &original_host(parts),
        &target.host,
        ctx.client,
    )?;
    let request = proxy::build_outbound_request(parts.method.clone(), &target, headers, body)?;

    let cache = route
        .is_bucket()
        .then(|| CachePolicy::for_bucket(presigned, state.config.cache.max_age));

    proxy::forward_and_relay(state.upstream.as_ref(), request, cache).await
}

/// Host the client addressed: `Host` header, else the URI authority, else empty
fn original_host(parts: &Parts) -> HeaderValue {
    if let Some(host) = parts.headers.get(HOST) {
        return host.clone();
    }
    parts
        .uri
        .authority()
        .and_then(|a| HeaderValue::from_str(a.as_str()).ok())
        .unwrap_or_else(|| HeaderValue::from_static(""))
}

fn header_string(parts: &Parts, name: &HeaderName) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn log_access(
    ctx: &RequestContext<'_>,
    response: &Response<ProxyBody>,
    started: Instant,
    state: &AppState,
) {
    let parts = ctx.parts;
    let mut entry = AccessLogEntry::new(
        ctx.client.client_ip(&parts.headers),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = format!("{:?}", parts.version)
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    entry.referer = header_string(parts, &REFERER);
    entry.user_agent = header_string(parts, &USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry.upstream_host.clone_from(&ctx.upstream_host);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::default_config;
    use crate::proxy::upstream::testing::MockUpstream;
    use http_body_util::{BodyExt, Full};
    use hyper::header::CACHE_CONTROL;

    const PEER: &str = "203.0.113.9:50000";
    const PRESIGN_QUERY: &str = "X-Amz-Algorithm=X&X-Amz-Credential=Y&X-Amz-Signature=Z";

    fn state_with(upstream: &Arc<MockUpstream>) -> Arc<AppState> {
        Arc::new(AppState::new(default_config(), upstream.clone()))
    }

    fn ok_upstream() -> Arc<MockUpstream> {
        Arc::new(MockUpstream::responding(
            StatusCode::OK,
            &[("cache-control", "max-age=1"), ("content-length", "5")],
            "hello",
        ))
    }

    fn get(uri: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header("host", "cdn.example.com")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    async fn send(
        req: Request<Full<Bytes>>,
        state: Arc<AppState>,
    ) -> (StatusCode, hyper::HeaderMap, String) {
        let response = handle_request(req, PEER, state).await.unwrap();
        let (parts, body) = response.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes();
        (parts.status, parts.headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let upstream = ok_upstream();
        let (status, _, body) = send(get("/_internal/health"), state_with(&upstream)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
        assert!(upstream.seen().is_empty());
    }

    #[tokio::test]
    async fn test_favicon_endpoint() {
        let upstream = ok_upstream();
        let (status, _, body) = send(get("/favicon.ico"), state_with(&upstream)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
        assert!(upstream.seen().is_empty());
    }

    #[tokio::test]
    async fn test_static_paths_only_answer_get() {
        let upstream = ok_upstream();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/_internal/health")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, _, _) = send(req, state_with(&upstream)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(upstream.seen().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_bucket_never_reaches_upstream() {
        let upstream = ok_upstream();
        let state = state_with(&upstream);
        for uri in ["/Bad_Bucket/key", "/-x-/key", "/a.b.c/key", "//key", "/ab/key"] {
            let (status, _, body) = send(get(uri), Arc::clone(&state)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, "Invalid bucket name");
        }
        assert!(upstream.seen().is_empty());
    }

    #[tokio::test]
    async fn test_public_bucket_request() {
        let upstream = ok_upstream();
        let (status, headers, body) =
            send(get("/mybucket/path/to/object.txt"), state_with(&upstream)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "hello");
        assert_eq!(headers[CACHE_CONTROL], "public, max-age=2629800");

        let seen = upstream.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].uri,
            "https://mybucket.nbg1.your-objectstorage.com/path/to/object.txt"
        );
        assert_eq!(seen[0].headers["host"], "mybucket.nbg1.your-objectstorage.com");
        assert_eq!(seen[0].headers["x-forwarded-host"], "cdn.example.com");
        assert_eq!(seen[0].headers["x-real-ip"], "203.0.113.9");
        assert_eq!(seen[0].headers["x-forwarded-for"], "203.0.113.9");
    }

    #[tokio::test]
    async fn test_presigned_bucket_request() {
        let upstream = ok_upstream();
        let uri = format!("/mybucket/path/to/object.txt?{PRESIGN_QUERY}");
        let (status, headers, _) = send(get(&uri), state_with(&upstream)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers[CACHE_CONTROL],
            "private, no-store, no-cache, must-revalidate"
        );

        let seen = upstream.seen();
        assert_eq!(
            seen[0].uri,
            format!(
                "https://nbg1.your-objectstorage.com/mybucket/path/to/object.txt?{PRESIGN_QUERY}"
            )
        );
        assert_eq!(seen[0].headers["host"], "nbg1.your-objectstorage.com");
    }

    #[tokio::test]
    async fn test_root_request_keeps_upstream_cache_control() {
        let upstream = ok_upstream();
        let (status, headers, _) =
            send(get(&format!("/?{PRESIGN_QUERY}")), state_with(&upstream)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CACHE_CONTROL], "max-age=1");
        let seen = upstream.seen();
        assert_eq!(
            seen[0].uri,
            format!("https://nbg1.your-objectstorage.com/?{PRESIGN_QUERY}")
        );
    }

    #[tokio::test]
    async fn test_method_and_body_forwarded() {
        let upstream = ok_upstream();
        let req = Request::builder()
            .method(Method::PUT)
            .uri("/mybucket/upload.bin")
            .header("content-type", "application/octet-stream")
            .header("x-amz-meta-owner", "alice")
            .body(Full::new(Bytes::from_static(b"payload")))
            .unwrap();
        send(req, state_with(&upstream)).await;

        let seen = upstream.seen();
        assert_eq!(seen[0].method, Method::PUT);
        assert_eq!(seen[0].body, "payload");
        assert_eq!(seen[0].headers["content-type"], "application/octet-stream");
        assert_eq!(seen[0].headers["x-amz-meta-owner"], "alice");
        // No inbound Host header: forwarded host falls back to empty
        assert_eq!(seen[0].headers["x-forwarded-host"], "");
    }

    #[tokio::test]
    async fn test_upstream_error_status_passed_through() {
        let upstream = Arc::new(MockUpstream::responding(
            StatusCode::FORBIDDEN,
            &[("content-type", "application/xml")],
            "<Error><Code>AccessDenied</Code></Error>",
        ));
        let (status, headers, body) = send(get("/mybucket/secret"), state_with(&upstream)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(headers["content-type"], "application/xml");
        assert_eq!(body, "<Error><Code>AccessDenied</Code></Error>");
        // Bucket route: still overridden, even on error statuses
        assert_eq!(headers[CACHE_CONTROL], "public, max-age=2629800");
    }

    #[tokio::test]
    async fn test_transport_failure_is_bad_gateway() {
        let upstream = Arc::new(MockUpstream::failing("dns error: no such host"));
        let (status, _, body) = send(get("/mybucket/obj"), state_with(&upstream)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.starts_with("Proxy error: "));
        assert!(body.contains("dns error: no such host"));
    }

    #[tokio::test]
    async fn test_configured_cache_age_used() {
        let upstream = ok_upstream();
        let mut cfg = default_config();
        cfg.cache.max_age = 60;
        let state = Arc::new(AppState::new(cfg, upstream.clone()));
        let (_, headers, _) = send(get("/mybucket/obj"), state).await;
        assert_eq!(headers[CACHE_CONTROL], "public, max-age=60");
    }

    #[test]
    fn test_original_host_from_authority() {
        let (parts, ()) = Request::builder()
            .uri("http://proxy.internal:3000/mybucket/x")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(original_host(&parts), "proxy.internal:3000");
    }
}
