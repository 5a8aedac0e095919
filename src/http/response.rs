//! HTTP response building module
//!
//! Every response body in the server is a [`ProxyBody`], so locally generated
//! responses and streamed upstream bodies share one type.

use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::{Response, StatusCode};

use crate::error::{BoxError, ProxyError};

/// Type-erased streaming body used for both directions of the proxy
pub type ProxyBody = UnsyncBoxBody<Bytes, BoxError>;

/// Erase a concrete body type into a [`ProxyBody`] without buffering it
pub fn boxed<B>(body: B) -> ProxyBody
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    body.map_err(Into::into).boxed_unsync()
}

fn text_body(text: impl Into<Bytes>) -> ProxyBody {
    boxed(Full::new(text.into()))
}

/// Build plain-text response with the given status
fn build_text_response(status: StatusCode, text: String) -> Response<ProxyBody> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(text_body(text.clone()))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(text_body(text))
        })
}

/// Build health check response
pub fn build_health_response(body: &'static str) -> Response<ProxyBody> {
    build_text_response(StatusCode::OK, body.to_string())
}

/// Build empty response (favicon)
pub fn build_empty_response(status: StatusCode) -> Response<ProxyBody> {
    let mut response = Response::new(text_body(Bytes::new()));
    *response.status_mut() = status;
    response
}

/// Build the client-facing response for a failed request
pub fn build_error_response(err: &ProxyError) -> Response<ProxyBody> {
    build_text_response(err.status(), err.to_string())
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
