//! Client IP derivation.
//!
//! Honors `X-Forwarded-For` and `X-Real-IP` before falling back to the TCP
//! peer address.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::http::HeaderMap;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Address reported for requests without any usable source.
const UNKNOWN: &str = "Unknown";

/// Client address as seen through any proxies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ClientIp {
    /// Originating client address.
    pub ip: String,
    /// Proxy addresses after the first `X-Forwarded-For` entry, in order.
    pub forwarded: Vec<String>,
}

/// Derive the client IP for a request.
///
/// With `debug` set, request headers and forwarding entries are logged.
pub(crate) fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, debug: bool) -> ClientIp {
    if debug {
        for (name, value) in headers {
            tracing::info!(header = %name, value = ?value, "Request header");
        }
    }

    if let Some(xff) = header_str(headers, X_FORWARDED_FOR) {
        let mut entries = xff.split(',').map(str::trim);
        let ip = entries.next().unwrap_or_default().to_owned();
        let forwarded: Vec<String> = entries.map(str::to_owned).collect();
        if debug {
            tracing::info!(client = %ip, forwarded = ?forwarded, "X-Forwarded-For");
        }
        return ClientIp { ip, forwarded };
    }

    if let Some(real_ip) = header_str(headers, X_REAL_IP) {
        return ClientIp {
            ip: real_ip.to_owned(),
            forwarded: Vec::new(),
        };
    }

    ClientIp {
        ip: peer.map_or_else(|| UNKNOWN.to_owned(), |addr| peer_ip(addr.ip())),
        forwarded: Vec::new(),
    }
}

/// Format a peer address, reporting IPv6 loopback as `127.0.0.1`.
///
/// IPv4-mapped IPv6 addresses are shown as plain IPv4. The IPv6 scope id is
/// kept on the socket address, not the IP, so no zone suffix appears.
fn peer_ip(ip: IpAddr) -> String {
    match ip.to_canonical() {
        IpAddr::V6(v6) if v6.is_loopback() => Ipv4Addr::LOCALHOST.to_string(),
        other => other.to_string(),
    }
}

/// Non-empty header value as a string.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use pretty_assertions::assert_eq;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn peer(addr: &str) -> Option<SocketAddr> {
        Some(addr.parse().unwrap())
    }

    #[test]
    fn test_forwarded_for_single() {
        let result = client_ip(
            &headers(&[(X_FORWARDED_FOR, "203.0.113.7")]),
            peer("10.0.0.1:5000"),
            false,
        );
        assert_eq!(
            result,
            ClientIp {
                ip: "203.0.113.7".to_owned(),
                forwarded: Vec::new(),
            }
        );
    }

    #[test]
    fn test_forwarded_for_chain() {
        let result = client_ip(
            &headers(&[(X_FORWARDED_FOR, "203.0.113.7, 198.51.100.2 ,10.0.0.3")]),
            None,
            true,
        );
        assert_eq!(result.ip, "203.0.113.7");
        assert_eq!(result.forwarded, vec!["198.51.100.2", "10.0.0.3"]);
    }

    #[test]
    fn test_forwarded_for_wins_over_real_ip() {
        let result = client_ip(
            &headers(&[(X_FORWARDED_FOR, "203.0.113.7"), (X_REAL_IP, "192.0.2.9")]),
            None,
            false,
        );
        assert_eq!(result.ip, "203.0.113.7");
    }

    #[test]
    fn test_real_ip() {
        let result = client_ip(&headers(&[(X_REAL_IP, "192.0.2.9")]), peer("10.0.0.1:1"), false);
        assert_eq!(result.ip, "192.0.2.9");
        assert!(result.forwarded.is_empty());
    }

    #[test]
    fn test_empty_headers_fall_through() {
        let result = client_ip(
            &headers(&[(X_FORWARDED_FOR, ""), (X_REAL_IP, "")]),
            peer("192.0.2.44:8000"),
            false,
        );
        assert_eq!(result.ip, "192.0.2.44");
    }

    #[test]
    fn test_peer_ipv4() {
        let result = client_ip(&HeaderMap::new(), peer("192.0.2.44:51000"), false);
        assert_eq!(result.ip, "192.0.2.44");
    }

    #[test]
    fn test_peer_ipv6_loopback() {
        let result = client_ip(&HeaderMap::new(), peer("[::1]:51000"), false);
        assert_eq!(result.ip, "127.0.0.1");
    }

    #[test]
    fn test_peer_ipv6_with_zone() {
        let result = client_ip(&HeaderMap::new(), peer("[fe80::1%2]:51000"), false);
        assert_eq!(result.ip, "fe80::1");
    }

    #[test]
    fn test_peer_ipv4_mapped() {
        let result = client_ip(&HeaderMap::new(), peer("[::ffff:192.0.2.1]:80"), false);
        assert_eq!(result.ip, "192.0.2.1");
    }

    #[test]
    fn test_no_peer_is_unknown() {
        let result = client_ip(&HeaderMap::new(), None, false);
        assert_eq!(result.ip, "Unknown");
    }
}
