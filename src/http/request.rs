//! Request inspection helpers.
//!
//! # Responsibilities
//! - Resolve the client address behind proxies
//! - Name the request ID header shared by the tower-http layers
//!
//! # Design Decisions
//! - `X-Forwarded-For` first entry wins, then `X-Real-IP`, then the peer
//! - Unparsable forwarding headers are skipped, not trusted verbatim

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderMap, HeaderName},
};

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// The originating client address of a request, if it can be determined.
pub fn client_ip(request: &Request) -> Option<IpAddr> {
    forwarded_ip(request.headers()).or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    })
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let from_forwarded_for = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse().ok());

    from_forwarded_for.or_else(|| {
        headers
            .get(X_REAL_IP)
            .and_then(|v| v.to_str().ok())
            .and_then(|ip| ip.trim().parse().ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_forwarded_for_first_entry() {
        let request = axum::http::Request::builder()
            .header("X-Forwarded-For", "203.0.113.9, 10.0.0.1")
            .header("X-Real-IP", "10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request), Some("203.0.113.9".parse().unwrap()));
    }

    #[test]
    fn test_real_ip_fallback() {
        let request = axum::http::Request::builder()
            .header("X-Forwarded-For", "garbage")
            .header("X-Real-IP", "10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request), Some("10.0.0.2".parse().unwrap()));
    }

    #[test]
    fn test_peer_address() {
        let mut request = axum::http::Request::builder().body(Body::empty()).unwrap();
        let peer: SocketAddr = "192.0.2.1:51000".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(client_ip(&request), Some(peer.ip()));
    }

    #[test]
    fn test_unknown() {
        let request = axum::http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_ip(&request), None);
    }
}
