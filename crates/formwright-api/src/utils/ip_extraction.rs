//! Client IP extraction for submitter metadata

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{request::Parts, HeaderMap};
use chrono::Utc;
use formwright_core::models::SubmitterInfo;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

/// Submitter metadata for the current request.
///
/// The socket peer is only known when the server was started with
/// `into_make_service_with_connect_info`.
#[derive(Debug, Clone)]
pub struct ClientInfo(pub SubmitterInfo);

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let socket = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientInfo(SubmitterInfo {
            ip: extract_client_ip(&parts.headers, socket.as_ref()),
            user_agent: extract_user_agent(&parts.headers),
            timestamp: Utc::now(),
        }))
    }
}

/// Client IP from proxy headers, falling back to the socket peer.
///
/// Only the hop closest to us in `X-Forwarded-For` is used; earlier entries
/// are client-controlled.
pub fn extract_client_ip(headers: &HeaderMap, socket_addr: Option<&SocketAddr>) -> Option<String> {
    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(last_forwarded_hop)
    {
        return Some(ip);
    }

    if let Some(ip) = headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|ip| is_valid_ip(ip))
    {
        return Some(ip.to_string());
    }

    socket_addr.map(|addr| addr.ip().to_string())
}

fn last_forwarded_hop(header_value: &str) -> Option<String> {
    header_value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .next_back()
        .filter(|ip| is_valid_ip(ip))
        .map(String::from)
}

fn is_valid_ip(ip_str: &str) -> bool {
    ip_str.parse::<IpAddr>().is_ok()
}

/// `User-Agent` header, if present and readable
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_forwarded_for_uses_closest_hop() {
        let headers = headers("x-forwarded-for", "203.0.113.9, 10.0.0.1");
        assert_eq!(extract_client_ip(&headers, None).as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_invalid_forwarded_for_falls_back_to_socket() {
        let headers = headers("x-forwarded-for", "not.an.ip");
        let socket = SocketAddr::from(([127, 0, 0, 1], 8080));
        assert_eq!(
            extract_client_ip(&headers, Some(&socket)).as_deref(),
            Some("127.0.0.1")
        );
    }

    #[test]
    fn test_real_ip_header() {
        let headers = headers("x-real-ip", " ::1 ");
        assert_eq!(extract_client_ip(&headers, None).as_deref(), Some("::1"));
    }

    #[test]
    fn test_no_source() {
        assert_eq!(extract_client_ip(&HeaderMap::new(), None), None);
    }

    #[tokio::test]
    async fn test_client_info_extractor() {
        let request = axum::http::Request::builder()
            .header("x-real-ip", "198.51.100.7")
            .header("user-agent", "Mozilla/5.0")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let ClientInfo(info) = ClientInfo::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(info.ip.as_deref(), Some("198.51.100.7"));
        assert_eq!(info.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_user_agent() {
        let headers = headers("user-agent", "curl/8.5.0");
        assert_eq!(extract_user_agent(&headers).as_deref(), Some("curl/8.5.0"));
        assert_eq!(extract_user_agent(&HeaderMap::new()), None);
    }
}
