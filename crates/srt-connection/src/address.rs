//! `srt://` address parsing and IPv4 resolution

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;

use srt_core::{SocketOptions, SrtError};
use url::Url;

/// The only scheme a connection accepts
pub const SRT_SCHEME: &str = "srt";

/// A validated `srt://host:port[?options]` address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrtAddress {
    uri: Url,
    host: String,
    port: u16,
}

impl SrtAddress {
    /// Parse and validate an address string
    pub fn parse(address: &str) -> Result<Self, SrtError> {
        let uri = Url::parse(address).map_err(|e| {
            SrtError::InvalidArgument(format!("Invalid address '{}': {}", address, e))
        })?;
        Self::from_uri(uri)
    }

    /// Validate an already parsed URI: scheme `srt`, a host and a port
    pub fn from_uri(uri: Url) -> Result<Self, SrtError> {
        if uri.scheme() != SRT_SCHEME {
            return Err(SrtError::InvalidArgument(format!(
                "Unsupported scheme '{}', expected '{}'",
                uri.scheme(),
                SRT_SCHEME
            )));
        }

        let host = uri
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| SrtError::InvalidArgument(format!("Missing host in '{}'", uri)))?
            .to_string();

        let port = uri
            .port()
            .ok_or_else(|| SrtError::InvalidArgument(format!("Missing port in '{}'", uri)))?;

        Ok(Self { uri, host, port })
    }

    /// The full address
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Host component, as written
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port component
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Socket options carried in the query component
    pub fn options(&self) -> SocketOptions {
        SocketOptions::from_uri(&self.uri)
    }
}

impl FromStr for SrtAddress {
    type Err = SrtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SrtAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri)
    }
}

/// Resolve `host` to an IPv4 socket address
///
/// Tries a dotted-decimal parse first, then a DNS lookup taking the first
/// IPv4 result. When neither yields an address the result is
/// `0.0.0.0:port` rather than an error; the socket connect that follows is
/// what fails. There is no timeout here.
pub async fn resolve_ipv4(host: &str, port: u16) -> SocketAddrV4 {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return SocketAddrV4::new(ip, port);
    }

    match tokio::net::lookup_host((host, port)).await {
        Ok(addrs) => {
            for addr in addrs {
                if let SocketAddr::V4(v4) = addr {
                    tracing::debug!("Resolved {} to {}", host, v4);
                    return v4;
                }
            }
            tracing::warn!("No IPv4 address for {}, using unspecified address", host);
        }
        Err(e) => {
            tracing::warn!(
                "DNS lookup for {} failed: {}. Using unspecified address",
                host,
                e
            );
        }
    }

    SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_address() {
        let addr = SrtAddress::parse("srt://127.0.0.1:9000?latency=120").unwrap();
        assert_eq!(addr.host(), "127.0.0.1");
        assert_eq!(addr.port(), 9000);
        assert_eq!(addr.options().get("latency"), Some("120"));
        assert_eq!(addr.to_string(), "srt://127.0.0.1:9000?latency=120");
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        for bad in ["udp://127.0.0.1:9000", "rtmp://example.com:1935/live"] {
            let err = SrtAddress::parse(bad).unwrap_err();
            assert!(err.is_invalid_argument(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_parse_rejects_missing_port() {
        let err = SrtAddress::parse("srt://example.com").unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("Missing port"));
    }

    #[test]
    fn test_parse_rejects_missing_host() {
        let err = SrtAddress::parse("srt:no-authority").unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("Missing host"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(SrtAddress::parse("not an address").unwrap_err().is_invalid_argument());
        assert!(SrtAddress::parse("").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_from_str() {
        let addr: SrtAddress = "srt://media.example.com:7001".parse().unwrap();
        assert_eq!(addr.host(), "media.example.com");
        assert_eq!(addr.port(), 7001);
    }

    #[tokio::test]
    async fn test_resolve_dotted_decimal_skips_dns() {
        let addr = resolve_ipv4("127.0.0.1", 9000).await;
        assert_eq!(addr.to_string(), "127.0.0.1:9000");
    }

    #[tokio::test]
    async fn test_resolve_failure_yields_unspecified() {
        let addr = resolve_ipv4("nonexistent-test-host.invalid", 9000).await;
        assert_eq!(*addr.ip(), Ipv4Addr::UNSPECIFIED);
        assert_eq!(addr.port(), 9000);
    }
}
