//! Outbound URL guard. Candidate URLs come from search results and model
//! output, so hosts that are or resolve to internal addresses are refused.

use std::borrow::Cow;
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use tracing::warn;

use super::FetchError;

const DNS_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

pub trait DnsResolver {
    fn lookup(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = Result<Vec<IpAddr>, FetchError>> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDnsResolver;

impl DnsResolver for TokioDnsResolver {
    async fn lookup(&self, host: &str, port: u16) -> Result<Vec<IpAddr>, FetchError> {
        let addrs = tokio::time::timeout(
            DNS_LOOKUP_TIMEOUT,
            tokio::net::lookup_host(format!("{host}:{port}")),
        )
        .await
        .map_err(|_| FetchError::DnsResolution("DNS lookup timed out".to_string()))?
        .map_err(|e| FetchError::DnsResolution(e.to_string()))?;
        Ok(addrs.map(|a| a.ip()).collect())
    }
}

/// Userinfo never reaches the logs.
pub(super) fn redact(raw: &str) -> Cow<'_, str> {
    if !raw.contains('@') {
        return Cow::Borrowed(raw);
    }
    match url::Url::parse(raw) {
        Ok(mut parsed) if !parsed.username().is_empty() || parsed.password().is_some() => {
            let _ = parsed.set_username("");
            let _ = parsed.set_password(None);
            Cow::Owned(parsed.to_string())
        }
        _ => Cow::Borrowed(raw),
    }
}

/// Validates scheme and host, then checks every resolved address.
/// With `allow_private` only the scheme is checked.
pub(super) async fn check_url(
    raw: &str,
    resolver: &impl DnsResolver,
    allow_private: bool,
) -> Result<(), FetchError> {
    let parsed = parse_http_url(raw)?;
    if allow_private {
        return Ok(());
    }

    if is_internal_host(&parsed) {
        warn!(url = %redact(raw), "refusing internal host");
        return Err(FetchError::InternalHost);
    }

    if let Some(url::Host::Domain(domain)) = parsed.host() {
        let port = parsed.port_or_known_default().unwrap_or(80);
        for ip in resolver.lookup(domain, port).await? {
            if is_internal_ip(ip) {
                warn!(host = %domain, %ip, "host resolves to internal address");
                return Err(FetchError::InternalHost);
            }
        }
    }

    Ok(())
}

fn parse_http_url(raw: &str) -> Result<url::Url, FetchError> {
    let parsed = url::Url::parse(raw)?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(FetchError::InvalidScheme),
    }
}

fn is_internal_host(parsed: &url::Url) -> bool {
    match parsed.host() {
        Some(url::Host::Ipv4(v4)) => is_internal_ip(IpAddr::V4(v4)),
        Some(url::Host::Ipv6(v6)) => is_internal_ip(IpAddr::V6(v6)),
        Some(url::Host::Domain(domain)) => {
            let lower = domain.to_ascii_lowercase();
            lower == "localhost"
                || [".localhost", ".local", ".internal", ".arpa"]
                    .iter()
                    .any(|suffix| lower.ends_with(suffix))
        }
        None => true,
    }
}

fn is_internal_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_internal_v4(v4),
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || is_v6_link_local(v6)
                || is_v6_unique_local(v6)
                || v6.to_ipv4_mapped().is_some_and(is_internal_v4)
        }
    }
}

fn is_internal_v4(v4: Ipv4Addr) -> bool {
    let [a, b, ..] = v4.octets();
    v4.is_loopback()
        || v4.is_private()
        || v4.is_link_local()
        || v4.is_unspecified()
        || v4.is_broadcast()
        || a == 0
        // carrier-grade NAT, 100.64.0.0/10
        || (a == 100 && (64..=127).contains(&b))
}

fn is_v6_link_local(v6: Ipv6Addr) -> bool {
    (v6.segments()[0] & 0xffc0) == 0xfe80
}

fn is_v6_unique_local(v6: Ipv6Addr) -> bool {
    (v6.segments()[0] & 0xfe00) == 0xfc00
}

#[cfg(test)]
pub(crate) mod testing {
    use std::net::IpAddr;

    use super::{DnsResolver, FetchError};

    /// Answers every lookup with a fixed address list.
    pub(crate) struct StaticDns(pub(crate) Vec<IpAddr>);

    impl DnsResolver for StaticDns {
        async fn lookup(&self, _host: &str, _port: u16) -> Result<Vec<IpAddr>, FetchError> {
            Ok(self.0.clone())
        }
    }
}
