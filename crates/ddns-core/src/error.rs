//! Error types for the DDNS system
//!
//! The variants follow the life cycle of the daemon: the first three are
//! fatal at startup, the remaining ones are contained per family per pass.

use crate::types::RecordFamily;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Missing required field, or a field outside its valid set
    #[error("Invalid config: {0}")]
    ConfigInvalid(String),

    /// Provider API unreachable during the startup precheck
    #[error("Network connectivity check failed: {0}")]
    ConnectivityUnavailable(String),

    /// Account or zone lookup failed or matched nothing
    #[error("Failed to resolve account or zone: {0}")]
    AccountOrZoneUnresolved(String),

    /// No usable address for the requested family
    #[error("No {family} address available: {reason}")]
    AddressUnavailable {
        /// Family the address was requested for
        family: RecordFamily,
        /// Why resolution failed
        reason: String,
    },

    /// A provider query or mutation failed
    #[error("DNS provider call failed: {0}")]
    DirectoryCallFailed(String),

    /// Config file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigInvalid(msg.into())
    }

    /// Create a connectivity error
    pub fn connectivity(msg: impl Into<String>) -> Self {
        Self::ConnectivityUnavailable(msg.into())
    }

    /// Create an account/zone resolution error
    pub fn unresolved(msg: impl Into<String>) -> Self {
        Self::AccountOrZoneUnresolved(msg.into())
    }

    /// Create an address resolution error for `family`
    pub fn address(family: RecordFamily, reason: impl Into<String>) -> Self {
        Self::AddressUnavailable {
            family,
            reason: reason.into(),
        }
    }

    /// Create a provider call error
    pub fn directory(msg: impl Into<String>) -> Self {
        Self::DirectoryCallFailed(msg.into())
    }

    /// Whether this error must stop the daemon before the scheduler starts
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigInvalid(_)
                | Self::ConnectivityUnavailable(_)
                | Self::AccountOrZoneUnresolved(_)
                | Self::Io(_)
                | Self::Json(_)
        )
    }
}
