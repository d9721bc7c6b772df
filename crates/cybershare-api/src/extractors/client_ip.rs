//! Client address extraction.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::Extensions;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::state::AppState;

/// Client IP as seen through `server.trusted_proxies`.
#[derive(Debug, Clone)]
pub struct ClientIp(pub Option<String>);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ip = resolve(
            &parts.headers,
            &parts.extensions,
            &state.config.server.trusted_proxies,
        );
        Ok(ClientIp(ip.map(|ip| ip.to_string())))
    }
}

/// Resolve the client IP.
///
/// The socket peer is the client unless it is a trusted proxy. In that case
/// `X-Forwarded-For` is walked from the right, skipping further trusted
/// proxies, and the first other hop is the client. Requests without connect
/// info resolve to `None`.
pub fn resolve(
    headers: &HeaderMap,
    extensions: &Extensions,
    trusted_proxies: &[IpAddr],
) -> Option<IpAddr> {
    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())?;

    if !trusted_proxies.contains(&peer) {
        return Some(peer);
    }

    let forwarded = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
        .collect::<Vec<_>>();

    Some(
        forwarded
            .into_iter()
            .rev()
            .find(|hop| !trusted_proxies.contains(hop))
            .unwrap_or(peer),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_peer(addr: &str) -> Extensions {
        let mut extensions = Extensions::new();
        let addr: SocketAddr = addr.parse().unwrap();
        extensions.insert(ConnectInfo(addr));
        extensions
    }

    fn forwarded(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", value.parse().unwrap());
        headers
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_forwarded_header_ignored_from_untrusted_peer() {
        let resolved = resolve(
            &forwarded("203.0.113.7"),
            &from_peer("192.0.2.1:5000"),
            &[],
        );
        assert_eq!(resolved, Some(ip("192.0.2.1")));
    }

    #[test]
    fn test_trusted_proxy_hands_over_last_untrusted_hop() {
        let proxies = [ip("10.0.0.1"), ip("10.0.0.2")];
        let resolved = resolve(
            &forwarded("198.51.100.9, 203.0.113.7, 10.0.0.2"),
            &from_peer("10.0.0.1:443"),
            &proxies,
        );
        assert_eq!(resolved, Some(ip("203.0.113.7")));
    }

    #[test]
    fn test_trusted_proxy_without_header_is_the_client() {
        let resolved = resolve(&HeaderMap::new(), &from_peer("10.0.0.1:443"), &[ip("10.0.0.1")]);
        assert_eq!(resolved, Some(ip("10.0.0.1")));
    }

    #[test]
    fn test_garbage_hops_are_skipped() {
        let resolved = resolve(
            &forwarded("203.0.113.7, not-an-ip"),
            &from_peer("10.0.0.1:443"),
            &[ip("10.0.0.1")],
        );
        assert_eq!(resolved, Some(ip("203.0.113.7")));
    }

    #[test]
    fn test_unknown_without_connect_info() {
        assert!(resolve(&forwarded("203.0.113.7"), &Extensions::new(), &[]).is_none());
    }
}
