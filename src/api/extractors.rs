//! Request extractors

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use ipnetwork::IpNetwork;

/// Resolves the client address behind any trusted reverse proxies.
#[derive(Debug, Clone, Default)]
pub struct ClientResolver {
    trusted_proxies: Arc<Vec<IpNetwork>>,
}

impl ClientResolver {
    pub fn new(trusted_proxies: Vec<IpNetwork>) -> Self {
        Self {
            trusted_proxies: Arc::new(trusted_proxies),
        }
    }

    /// `X-Forwarded-For` is only honoured when the peer itself is a trusted
    /// proxy; the nearest untrusted hop in it is taken as the client.
    pub fn client_ip(&self, headers: &HeaderMap, peer: IpAddr) -> IpAddr {
        if !self.is_trusted(&peer) {
            return peer;
        }

        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|xff| {
                xff.rsplit(',')
                    .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
                    .find(|ip| !self.is_trusted(ip))
            })
            .unwrap_or(peer)
    }

    fn is_trusted(&self, ip: &IpAddr) -> bool {
        self.trusted_proxies.iter().any(|net| net.contains(*ip))
    }
}

/// Identity used to scope the creation rate limit.
///
/// The resolved client IP, or `anonymous` when the peer address is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIdentity
where
    ClientResolver: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let resolver = ClientResolver::from_ref(state);
        let identity = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| resolver.client_ip(&parts.headers, addr.ip()).to_string())
            .unwrap_or_else(|| "anonymous".to_string());
        Ok(Self(identity))
    }
}
