use crate::errors::ProbeError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::time::Duration;
use tokio::net::TcpStream;

static ENDPOINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"http://([^:/]+):?(\d+)?/").expect("endpoint pattern"));

/// Rewrite a channel template onto a relay IP.
///
/// The path segment is `rtp` when the template mentions `rtp` anywhere and
/// `udp` otherwise; the tail is whatever follows the last `://`.
pub fn relay_url(ip: &str, template_url: &str) -> String {
    let kind = if template_url.contains("rtp") { "rtp" } else { "udp" };
    let tail = template_url.rsplit("://").next().unwrap_or(template_url);
    format!("http://{}/{}/{}", ip, kind, tail)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

pub fn parse_endpoint(url: &str, default_port: u16) -> Result<Endpoint, ProbeError> {
    let caps = ENDPOINT_RE
        .captures(url)
        .ok_or_else(|| ProbeError::MalformedUrl(url.to_string()))?;

    let host = caps[1].to_string();
    let port = match caps.get(2) {
        Some(m) => m
            .as_str()
            .parse::<u16>()
            .map_err(|_| ProbeError::InvalidPort(m.as_str().to_string()))?,
        None => default_port,
    };

    Ok(Endpoint { host, port })
}

/// Reachability check for a relay URL.
#[allow(async_fn_in_trait)]
pub trait Probe {
    async fn probe(&self, url: &str) -> Result<Endpoint, ProbeError>;
}

/// Single TCP connect with a fixed timeout, no retry.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    pub timeout: Duration,
    pub default_port: u16,
}

impl TcpProbe {
    pub fn new(timeout: Duration, default_port: u16) -> Self {
        Self {
            timeout,
            default_port,
        }
    }
}

impl Probe for TcpProbe {
    async fn probe(&self, url: &str) -> Result<Endpoint, ProbeError> {
        let endpoint = parse_endpoint(url, self.default_port)?;
        let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));

        match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(_stream)) => Ok(endpoint),
            Ok(Err(source)) => Err(ProbeError::Connect {
                addr: endpoint.to_string(),
                source,
            }),
            Err(_) => Err(ProbeError::Timeout {
                addr: endpoint.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_relay_url_picks_rtp_or_udp() {
        assert_eq!(
            relay_url("1.2.3.4:8888", "rtp://239.3.1.1:8000"),
            "http://1.2.3.4:8888/rtp/239.3.1.1:8000"
        );
        assert_eq!(
            relay_url("1.2.3.4:8888", "udp://239.3.1.1:8000"),
            "http://1.2.3.4:8888/udp/239.3.1.1:8000"
        );
        assert_eq!(
            relay_url("1.2.3.4", "239.3.1.1:8000"),
            "http://1.2.3.4/udp/239.3.1.1:8000"
        );
    }

    #[test]
    fn test_parse_endpoint() {
        let ep = parse_endpoint("http://10.0.0.1:4022/rtp/239.1.1.1:5000", 80).unwrap();
        assert_eq!(ep, Endpoint { host: "10.0.0.1".into(), port: 4022 });

        let ep = parse_endpoint("http://example.net/udp/239.1.1.1:5000", 80).unwrap();
        assert_eq!(ep.port, 80);
        assert_eq!(ep.to_string(), "example.net:80");
    }

    #[test]
    fn test_parse_endpoint_errors() {
        assert!(matches!(
            parse_endpoint("rtp://239.1.1.1:5000", 80),
            Err(ProbeError::MalformedUrl(_))
        ));
        assert!(matches!(
            parse_endpoint("http://10.0.0.1:99999/rtp/x", 80),
            Err(ProbeError::InvalidPort(_))
        ));
    }

    #[tokio::test]
    async fn test_probe_open_and_closed_ports() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap();

        let closed = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap()
        };

        let probe = TcpProbe::new(Duration::from_millis(1500), 80);
        let url = relay_url(&open.to_string(), "rtp://239.0.0.1:5000");
        assert!(probe.probe(&url).await.is_ok());

        let url = relay_url(&closed.to_string(), "rtp://239.0.0.1:5000");
        let err = probe.probe(&url).await.unwrap_err();
        assert_eq!(err.kind(), "connect");
    }

    #[tokio::test]
    async fn test_probe_malformed_is_error_not_panic() {
        let probe = TcpProbe::new(Duration::from_millis(100), 80);
        assert!(probe.probe("not a url").await.is_err());
    }
}
