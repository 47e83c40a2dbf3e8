// # HTTP Trace Address Source
//
// This crate discovers the public address of the host by asking the
// Cloudflare trace endpoint which address a request came from.
//
// ## Architecture
//
// The endpoint answers with `key=value` lines, one of which is `ip=<addr>`.
// To learn the address of a specific family, the request itself must leave
// over that family: each family gets its own client bound to the unspecified
// local address of that family (`0.0.0.0` or `::`), so only remote addresses
// of the same family are dialed.
//
// No caching: every `resolve` performs one request.

use async_trait::async_trait;
use ddns_core::{AddressSource, Error, ObservedAddress, RecordFamily, Result};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

/// Trace endpoint
const TRACE_URL: &str = "https://api.cloudflare.com/cdn-cgi/trace";

const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Address source backed by the trace endpoint
pub struct TraceAddressSource {
    url: String,
    ipv4: reqwest::Client,
    ipv6: reqwest::Client,
}

impl TraceAddressSource {
    pub fn new() -> Result<Self> {
        Self::with_url(TRACE_URL)
    }

    /// Use a different trace endpoint
    pub fn with_url(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            ipv4: family_client(IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            ipv6: family_client(IpAddr::V6(Ipv6Addr::UNSPECIFIED))?,
        })
    }

    fn client(&self, family: RecordFamily) -> &reqwest::Client {
        match family {
            RecordFamily::A => &self.ipv4,
            RecordFamily::Aaaa => &self.ipv6,
        }
    }
}

fn family_client(local: IpAddr) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .local_address(local)
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
}

/// First `ip=` line of a trace body that is valid for `family`
pub fn parse_trace_body(body: &str, family: RecordFamily) -> Result<ObservedAddress> {
    let mut candidates = body
        .lines()
        .filter_map(|line| line.trim().strip_prefix("ip="))
        .map(str::trim)
        .peekable();

    if candidates.peek().is_none() {
        return Err(Error::address(family, "no ip= line in trace response"));
    }

    candidates
        .find_map(|literal| ObservedAddress::parse(literal, family).ok())
        .ok_or_else(|| Error::address(family, "no valid IP found in trace response"))
}

#[async_trait]
impl AddressSource for TraceAddressSource {
    async fn resolve(&self, family: RecordFamily) -> Result<ObservedAddress> {
        tracing::debug!("Fetching {} address from {}", family, self.url);

        let response = self
            .client(family)
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::address(family, format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::address(
                family,
                format!("HTTP error: {}", response.status()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::address(family, format!("Failed to read response: {}", e)))?;

        parse_trace_body(&body, family)
    }

    fn source_name(&self) -> &'static str {
        "trace"
    }
}
