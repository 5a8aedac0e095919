//! Outbound header rewriting
//!
//! All inbound headers are copied (every value, in order), then the
//! forwarding headers are overwritten. Nothing else is removed or renamed.

use std::net::{IpAddr, SocketAddr};

use hyper::header::{HeaderMap, HeaderName, HeaderValue, HOST};

use crate::error::ProxyError;

const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

/// What is known about the client of an inbound request
#[derive(Debug, Clone, Copy)]
pub struct ClientAddr<'a> {
    /// Connection peer address, normally `ip:port`
    pub remote_addr: &'a str,
    /// Whether inbound `X-Forwarded-For` / `X-Real-IP` may name the client
    pub trust_forwarded: bool,
}

impl ClientAddr<'_> {
    /// Peer host with the port removed, if the peer address parses as host:port
    pub fn peer_ip(&self) -> Option<String> {
        split_host_port(self.remote_addr)
    }

    /// Best-effort client IP
    ///
    /// With trusted forwarding headers: first entry of `X-Forwarded-For`, then
    /// `X-Real-IP`, each only if it is an IP address. Falls back to the peer
    /// host, or an empty string when even that is unknown.
    pub fn client_ip(&self, headers: &HeaderMap) -> String {
        if self.trust_forwarded {
            let forwarded = headers
                .get(&X_FORWARDED_FOR)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim);
            let real_ip = headers
                .get(&X_REAL_IP)
                .and_then(|v| v.to_str().ok())
                .map(str::trim);

            if let Some(ip) = [forwarded, real_ip]
                .into_iter()
                .flatten()
                .find(|candidate| candidate.parse::<IpAddr>().is_ok())
            {
                return ip.to_string();
            }
        }
        self.peer_ip().unwrap_or_default()
    }
}

/// Split `host:port` / `[v6]:port` and return the host part
fn split_host_port(addr: &str) -> Option<String> {
    if let Ok(sock) = addr.parse::<SocketAddr>() {
        return Some(sock.ip().to_string());
    }
    let (host, port) = addr.rsplit_once(':')?;
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if host.contains(':') {
        // Unbracketed IPv6 with a trailing segment is not host:port
        return None;
    }
    Some(host.to_string())
}

/// Produce outbound headers for a request going to `target_host`
///
/// `X-Forwarded-For` is overwritten, not appended to: an existing chain from
/// further downstream is replaced by the derived client IP.
pub fn rewrite_request_headers(
    inbound: &HeaderMap,
    original_host: &HeaderValue,
    target_host: &str,
    client: ClientAddr<'_>,
) -> Result<HeaderMap, ProxyError> {
    let mut headers = inbound.clone();

    let client_ip = client.client_ip(inbound);
    let real_ip = client.peer_ip().unwrap_or_else(|| client_ip.clone());

    headers.insert(
        HOST,
        HeaderValue::from_str(target_host).map_err(hyper::http::Error::from)?,
    );
    headers.insert(X_FORWARDED_HOST, original_host.clone());
    headers.insert(
        X_REAL_IP,
        HeaderValue::from_str(&real_ip).map_err(hyper::http::Error::from)?,
    );
    headers.insert(
        X_FORWARDED_FOR,
        HeaderValue::from_str(&client_ip).map_err(hyper::http::Error::from)?,
    );

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(remote_addr: &str) -> ClientAddr<'_> {
        ClientAddr {
            remote_addr,
            trust_forwarded: true,
        }
    }

    fn rewrite(inbound: &HeaderMap, remote_addr: &str) -> HeaderMap {
        rewrite_request_headers(
            inbound,
            &HeaderValue::from_static("proxy.example.com"),
            "mybucket.nbg1.your-objectstorage.com",
            client(remote_addr),
        )
        .unwrap()
    }

    #[test]
    fn test_forwarding_headers_always_present() {
        let out = rewrite(&HeaderMap::new(), "203.0.113.7:51234");
        assert_eq!(out["host"], "mybucket.nbg1.your-objectstorage.com");
        assert_eq!(out["x-forwarded-host"], "proxy.example.com");
        assert_eq!(out["x-real-ip"], "203.0.113.7");
        assert_eq!(out["x-forwarded-for"], "203.0.113.7");
    }

    #[test]
    fn test_multi_value_headers_preserved_in_order() {
        let mut inbound = HeaderMap::new();
        inbound.append("cookie", HeaderValue::from_static("a=1"));
        inbound.append("cookie", HeaderValue::from_static("b=2"));
        inbound.append("x-custom", HeaderValue::from_static("kept"));
        inbound.insert("range", HeaderValue::from_static("bytes=0-99"));

        let out = rewrite(&inbound, "10.0.0.1:80");
        let cookies: Vec<_> = out.get_all("cookie").iter().collect();
        assert_eq!(cookies, ["a=1", "b=2"]);
        assert_eq!(out["x-custom"], "kept");
        assert_eq!(out["range"], "bytes=0-99");
    }

    #[test]
    fn test_inbound_host_replaced() {
        let mut inbound = HeaderMap::new();
        inbound.insert(HOST, HeaderValue::from_static("proxy.example.com"));
        let out = rewrite(&inbound, "10.0.0.1:80");
        assert_eq!(out.get_all(HOST).iter().count(), 1);
        assert_eq!(out[HOST], "mybucket.nbg1.your-objectstorage.com");
    }

    #[test]
    fn test_forwarded_for_is_overwritten() {
        let mut inbound = HeaderMap::new();
        inbound.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.1, 10.0.0.2"));
        let out = rewrite(&inbound, "10.0.0.3:4000");
        assert_eq!(out.get_all("x-forwarded-for").iter().count(), 1);
        assert_eq!(out["x-forwarded-for"], "198.51.100.1");
        // X-Real-IP always names the connection peer
        assert_eq!(out["x-real-ip"], "10.0.0.3");
    }

    #[test]
    fn test_untrusted_forwarding_headers_ignored() {
        let mut inbound = HeaderMap::new();
        inbound.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.1"));
        let out = rewrite_request_headers(
            &inbound,
            &HeaderValue::from_static("proxy.example.com"),
            "nbg1.your-objectstorage.com",
            ClientAddr {
                remote_addr: "10.0.0.3:4000",
                trust_forwarded: false,
            },
        )
        .unwrap();
        assert_eq!(out["x-forwarded-for"], "10.0.0.3");
    }

    #[test]
    fn test_client_ip_skips_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        headers.insert("x-real-ip", HeaderValue::from_static("2001:db8::1"));
        assert_eq!(client("10.0.0.1:1").client_ip(&headers), "2001:db8::1");
    }

    #[test]
    fn test_unparseable_peer_falls_back_to_client_ip() {
        let mut inbound = HeaderMap::new();
        inbound.insert("x-real-ip", HeaderValue::from_static("192.0.2.44"));
        let out = rewrite(&inbound, "@unix-socket");
        assert_eq!(out["x-real-ip"], "192.0.2.44");
        assert_eq!(out["x-forwarded-for"], "192.0.2.44");

        let out = rewrite(&HeaderMap::new(), "@unix-socket");
        assert_eq!(out["x-real-ip"], "");
        assert_eq!(out["x-forwarded-for"], "");
    }

    #[test]
    fn test_split_host_port() {
        assert_eq!(split_host_port("1.2.3.4:80").as_deref(), Some("1.2.3.4"));
        assert_eq!(split_host_port("[::1]:8080").as_deref(), Some("::1"));
        assert_eq!(split_host_port("localhost:3000").as_deref(), Some("localhost"));
        assert_eq!(split_host_port("1.2.3.4"), None);
        assert_eq!(split_host_port("::1"), None);
    }
}
