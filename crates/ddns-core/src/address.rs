//! Address specification parsing and the static address source
//!
//! The `ip` config field is either `"auto"`, a single literal used for every
//! family, or an `"ipv4,ipv6"` pair.

use crate::error::{Error, Result};
use crate::traits::AddressSource;
use crate::types::{ObservedAddress, RecordFamily};
use async_trait::async_trait;

/// Where the desired address of each family comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AddressSpec {
    /// Ask the trace endpoint every pass
    #[default]
    Auto,
    /// One literal for any family
    Single(String),
    /// Family-separated literals
    Pair { ipv4: String, ipv6: String },
}

impl AddressSpec {
    /// Parse the `ip` config value
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == "auto" {
            return AddressSpec::Auto;
        }

        match raw.split_once(',') {
            Some((ipv4, rest)) => {
                let ipv6 = rest.split(',').next().unwrap_or_default();
                AddressSpec::Pair {
                    ipv4: ipv4.trim().to_string(),
                    ipv6: ipv6.trim().to_string(),
                }
            }
            None => AddressSpec::Single(raw.to_string()),
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, AddressSpec::Auto)
    }

    /// Literal configured for `family`, `None` for [`AddressSpec::Auto`]
    pub fn select(&self, family: RecordFamily) -> Option<&str> {
        match self {
            AddressSpec::Auto => None,
            AddressSpec::Single(literal) => Some(literal),
            AddressSpec::Pair { ipv4, .. } if family == RecordFamily::A => Some(ipv4),
            AddressSpec::Pair { ipv6, .. } => Some(ipv6),
        }
    }
}

/// Address source backed by configured literals
#[derive(Debug, Clone)]
pub struct StaticAddressSource {
    spec: AddressSpec,
}

impl StaticAddressSource {
    /// Create a static source
    ///
    /// # Errors
    ///
    /// `ConfigInvalid` if `spec` is [`AddressSpec::Auto`].
    pub fn new(spec: AddressSpec) -> Result<Self> {
        if spec.is_auto() {
            return Err(Error::config(
                "static address source needs a literal, got \"auto\"",
            ));
        }
        Ok(Self { spec })
    }
}

#[async_trait]
impl AddressSource for StaticAddressSource {
    async fn resolve(&self, family: RecordFamily) -> Result<ObservedAddress> {
        let literal = self
            .spec
            .select(family)
            .ok_or_else(|| Error::address(family, "no static address configured"))?;

        ObservedAddress::parse(literal, family)
            .map_err(|_| Error::address(family, format!("invalid static IP format: '{}'", literal)))
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}
