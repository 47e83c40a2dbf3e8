//! Data model shared by the resolver, the reconciler and the scheduler

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Address family of a DNS record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordFamily {
    /// IPv4 address record
    #[serde(rename = "A")]
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordFamily {
    /// The record type as the provider spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordFamily::A => "A",
            RecordFamily::Aaaa => "AAAA",
        }
    }

    /// Whether `literal` is a valid address of this family
    ///
    /// `A` accepts dotted IPv4 only. `AAAA` accepts IPv6 literals that are
    /// not representable as IPv4, so IPv4-mapped addresses are rejected.
    pub fn accepts(&self, literal: &str) -> bool {
        match (self, literal.parse::<IpAddr>()) {
            (RecordFamily::A, Ok(IpAddr::V4(_))) => true,
            (RecordFamily::Aaaa, Ok(IpAddr::V6(v6))) => v6.to_ipv4_mapped().is_none(),
            _ => false,
        }
    }
}

impl fmt::Display for RecordFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which families a run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordTypeSelector {
    /// `A` only
    #[default]
    A,
    /// `AAAA` only
    Aaaa,
    /// `A` then `AAAA`
    Both,
}

impl RecordTypeSelector {
    /// Families reconciled per pass, in processing order
    pub fn families(&self) -> &'static [RecordFamily] {
        match self {
            RecordTypeSelector::A => &[RecordFamily::A],
            RecordTypeSelector::Aaaa => &[RecordFamily::Aaaa],
            RecordTypeSelector::Both => &[RecordFamily::A, RecordFamily::Aaaa],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordTypeSelector::A => "A",
            RecordTypeSelector::Aaaa => "AAAA",
            RecordTypeSelector::Both => "A_AAAA",
        }
    }
}

impl FromStr for RecordTypeSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A" => Ok(RecordTypeSelector::A),
            "AAAA" => Ok(RecordTypeSelector::Aaaa),
            "A_AAAA" => Ok(RecordTypeSelector::Both),
            other => Err(Error::config(format!(
                "invalid type: {} (must be A/AAAA/A_AAAA)",
                other
            ))),
        }
    }
}

/// Record TTL in seconds, restricted to the values the provider accepts
///
/// `1` means "automatic" on Cloudflare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ttl(u32);

impl Ttl {
    /// Every TTL the provider accepts
    pub const VALID: [u32; 11] = [
        1, 120, 300, 600, 900, 1800, 3600, 7200, 18000, 43200, 86400,
    ];

    /// Provider-managed TTL
    pub const AUTO: Ttl = Ttl(1);

    pub fn new(secs: u32) -> Result<Self> {
        if Self::VALID.contains(&secs) {
            Ok(Ttl(secs))
        } else {
            Err(Error::config(format!("invalid TTL: {}", secs)))
        }
    }

    pub fn secs(&self) -> u32 {
        self.0
    }
}

impl Default for Ttl {
    fn default() -> Self {
        Self::AUTO
    }
}

/// What a pass does with the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Create the record or update it to the observed address
    #[default]
    Upsert,
    /// Remove the record
    Delete,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Upsert => "upsert",
            Mode::Delete => "delete",
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "upsert" => Ok(Mode::Upsert),
            "delete" => Ok(Mode::Delete),
            other => Err(Error::config(format!(
                "invalid mode: {} (must be upsert/delete)",
                other
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a pass needs to know about the record it converges
///
/// Built once from validated configuration after the zone is resolved and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationTarget {
    pub zone_id: String,
    pub record_name: String,
    pub selector: RecordTypeSelector,
    pub ttl: Ttl,
    pub proxied: bool,
    pub mode: Mode,
}

impl ReconciliationTarget {
    /// Families covered by this target, in processing order
    pub fn families(&self) -> &'static [RecordFamily] {
        self.selector.families()
    }

    /// Desired record body for `family` pointing at `address`
    pub fn payload(&self, address: &ObservedAddress) -> RecordPayload {
        RecordPayload {
            record_type: address.family(),
            name: self.record_name.clone(),
            content: address.as_str().to_string(),
            ttl: self.ttl,
            proxied: self.proxied,
        }
    }
}

/// A public address validated against the family it was requested for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedAddress {
    family: RecordFamily,
    literal: String,
}

impl ObservedAddress {
    /// Validate `literal` for `family`
    ///
    /// The literal is kept verbatim; record contents are compared against
    /// it as plain strings.
    pub fn parse(literal: &str, family: RecordFamily) -> Result<Self> {
        if family.accepts(literal) {
            Ok(Self {
                family,
                literal: literal.to_string(),
            })
        } else {
            Err(Error::address(
                family,
                format!("'{}' is not a valid {} address", literal, family),
            ))
        }
    }

    pub fn family(&self) -> RecordFamily {
        self.family
    }

    pub fn as_str(&self) -> &str {
        &self.literal
    }
}

impl fmt::Display for ObservedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

/// Body sent when creating or updating a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordPayload {
    #[serde(rename = "type")]
    pub record_type: RecordFamily,
    pub name: String,
    pub content: String,
    pub ttl: Ttl,
    pub proxied: bool,
}

/// State of the remote record as seen in the current pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRecordState {
    Absent,
    Present { record_id: String, content: String },
}
