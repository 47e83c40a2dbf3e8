//! Configuration types for the DDNS daemon
//!
//! [`DdnsConfig`] mirrors the JSON config file. [`DdnsConfig::validate`]
//! applies defaults, checks every field against its valid set and produces a
//! typed [`ValidatedConfig`]. No network call happens before validation
//! succeeds.

use crate::address::AddressSpec;
use crate::error::{Error, Result};
use crate::types::{Mode, ReconciliationTarget, RecordTypeSelector, Ttl};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Poll interval used when `update_interval` is absent
pub const DEFAULT_UPDATE_INTERVAL_SECS: i64 = 300;

/// Config file contents
///
/// Empty strings and a zero TTL are treated as absent, so the field falls
/// back to its default.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Account email sent as `X-Auth-Email`
    #[serde(default)]
    pub x_auth_email: String,

    /// Global API key sent as `X-Auth-Key`
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub x_auth_key: String,

    /// Zone that holds the record (e.g. "example.com")
    #[serde(default)]
    pub zone_name: String,

    /// Fully qualified record name (e.g. "ddns.example.com")
    #[serde(default)]
    pub record_name: String,

    /// `A`, `AAAA` or `A_AAAA` (default: `A`)
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,

    /// One of [`Ttl::VALID`] (default: 1, automatic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,

    /// `"auto"`, a literal, or `"ipv4,ipv6"` (default: `auto`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    /// Whether the record is proxied through Cloudflare (default: false)
    #[serde(default)]
    pub proxy_status: bool,

    /// `upsert` or `delete` (default: `upsert`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Seconds between passes; 0 or less runs once (default: 300)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_interval: Option<i64>,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for DdnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DdnsConfig")
            .field("x_auth_email", &self.x_auth_email)
            .field("x_auth_key", &"<REDACTED>")
            .field("zone_name", &self.zone_name)
            .field("record_name", &self.record_name)
            .field("record_type", &self.record_type)
            .field("ttl", &self.ttl)
            .field("ip", &self.ip)
            .field("proxy_status", &self.proxy_status)
            .field("mode", &self.mode)
            .field("update_interval", &self.update_interval)
            .finish()
    }
}

impl DdnsConfig {
    /// Load a config file
    ///
    /// Read and parse failures are reported as `ConfigInvalid` with the path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("read config file {}: {}", path.display(), e))
        })?;
        Self::from_json(&data)
    }

    /// Parse config JSON
    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(|e| Error::config(format!("parse config: {}", e)))
    }

    /// Example config printed by `--generate-config`
    pub fn example() -> Self {
        Self {
            x_auth_email: "your-cloudflare-email@example.com".to_string(),
            x_auth_key: "your-cloudflare-api-key".to_string(),
            zone_name: "example.com".to_string(),
            record_name: "ddns.example.com".to_string(),
            record_type: Some("A_AAAA".to_string()),
            ttl: Some(1),
            ip: Some("auto".to_string()),
            proxy_status: false,
            mode: Some("upsert".to_string()),
            update_interval: Some(DEFAULT_UPDATE_INTERVAL_SECS),
        }
    }

    /// Pretty JSON rendering of [`DdnsConfig::example`]
    pub fn example_json() -> Result<String> {
        Ok(serde_json::to_string_pretty(&Self::example())?)
    }

    /// Apply defaults and validate every field
    ///
    /// # Errors
    ///
    /// `ConfigInvalid` naming the first offending field.
    pub fn validate(&self) -> Result<ValidatedConfig> {
        if self.x_auth_email.is_empty()
            || self.x_auth_key.is_empty()
            || self.zone_name.is_empty()
            || self.record_name.is_empty()
        {
            return Err(Error::config(
                "missing required fields (x_auth_email, x_auth_key, zone_name, record_name)",
            ));
        }

        let mode = match non_empty(&self.mode) {
            Some(mode) => mode.parse()?,
            None => Mode::default(),
        };

        let selector = match non_empty(&self.record_type) {
            Some(selector) => selector.parse()?,
            None => RecordTypeSelector::default(),
        };

        let ttl = match self.ttl {
            None | Some(0) => Ttl::default(),
            Some(secs) => Ttl::new(secs)?,
        };

        let address = non_empty(&self.ip)
            .map(AddressSpec::parse)
            .unwrap_or_default();

        let interval_secs = self.update_interval.unwrap_or(DEFAULT_UPDATE_INTERVAL_SECS);
        let interval = if interval_secs <= 0 {
            None
        } else {
            Some(Duration::from_secs(interval_secs as u64))
        };

        Ok(ValidatedConfig {
            credentials: Credentials {
                email: self.x_auth_email.clone(),
                key: self.x_auth_key.clone(),
            },
            zone_name: self.zone_name.clone(),
            record_name: self.record_name.clone(),
            selector,
            ttl,
            address,
            proxied: self.proxy_status,
            mode,
            interval,
        })
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Provider credential pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("key", &"<REDACTED>")
            .finish()
    }
}

/// Configuration after defaults and validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    pub credentials: Credentials,
    pub zone_name: String,
    pub record_name: String,
    pub selector: RecordTypeSelector,
    pub ttl: Ttl,
    pub address: AddressSpec,
    pub proxied: bool,
    pub mode: Mode,
    /// `None` runs a single pass
    pub interval: Option<Duration>,
}

impl ValidatedConfig {
    /// Build the immutable reconciliation target once the zone is resolved
    pub fn target(&self, zone_id: impl Into<String>) -> ReconciliationTarget {
        ReconciliationTarget {
            zone_id: zone_id.into(),
            record_name: self.record_name.clone(),
            selector: self.selector,
            ttl: self.ttl,
            proxied: self.proxied,
            mode: self.mode,
        }
    }
}
