// # Record Directory Trait
//
// Defines the query/mutate interface the reconciler consumes from the DNS
// provider.
//
// ## Implementations
//
// - Cloudflare v4 API: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{RecordDirectory, RecordFamily};
// use ddns_core::traits::{RecordLookupResult, ZoneLookupResult};
//
// let directory = /* RecordDirectory implementation */;
// if let ZoneLookupResult::Found(zone_id) = directory.find_zone_id("example.com").await? {
//     let lookup = directory
//         .find_record(&zone_id, "ddns.example.com", RecordFamily::A)
//         .await?;
// }
// ```

use crate::error::Result;
use crate::types::{RecordFamily, RecordPayload};
use async_trait::async_trait;

/// An account visible to the configured credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Not every listing carries it; only the name is needed at startup
    pub id: Option<String>,
    pub name: String,
}

/// Outcome of looking up a zone by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneLookupResult {
    /// Zone identifier of the first match
    Found(String),
    /// The provider returned no zone with that name
    NotFound,
    /// The reply did not have the expected shape
    Malformed(String),
}

/// Outcome of looking up a record by name and type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordLookupResult {
    /// First match in provider order, plus how many records matched
    Found { record_id: String, candidates: usize },
    NotFound,
    Malformed(String),
}

/// Outcome of reading a single record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordReadResult {
    /// Current record content, verbatim
    Found(String),
    NotFound,
    Malformed(String),
}

/// Trait for DNS provider implementations
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to the provider endpoint only
/// - ✅ Parse provider-specific responses into the tagged results above
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (owned by the scheduler: the next tick retries)
/// - ❌ Cache anything beyond a single request
/// - ❌ Decide whether a mutation is needed (owned by the reconciler)
///
/// Each method issues exactly one API call. Transport errors, timeouts and
/// non-success envelopes are returned as
/// [`crate::Error::DirectoryCallFailed`].
#[async_trait]
pub trait RecordDirectory: Send + Sync {
    /// Accounts visible to the credentials, in provider order
    async fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Zone identifier for `zone_name`
    async fn find_zone_id(&self, zone_name: &str) -> Result<ZoneLookupResult>;

    /// Identifier of the `family` record called `name` in `zone_id`
    async fn find_record(
        &self,
        zone_id: &str,
        name: &str,
        family: RecordFamily,
    ) -> Result<RecordLookupResult>;

    /// Current content of a record
    async fn read_record_content(&self, zone_id: &str, record_id: &str)
    -> Result<RecordReadResult>;

    async fn create_record(&self, zone_id: &str, payload: &RecordPayload) -> Result<()>;

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<()>;

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()>;

    /// Provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
