// # Address Source Trait
//
// Defines the interface for determining the current public address of one
// address family.
//
// ## Implementations
//
// - Static configuration: `crate::address::StaticAddressSource`
// - Trace endpoint discovery: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{AddressSource, RecordFamily};
//
// let source = /* AddressSource implementation */;
// let v4 = source.resolve(RecordFamily::A).await?;
// println!("WAN IP: {}", v4);
// ```

use crate::error::Result;
use crate::types::{ObservedAddress, RecordFamily};
use async_trait::async_trait;

/// Trait for address source implementations
///
/// # Trust Level: Semi-Trusted
///
/// ## Allowed Capabilities
/// - ✅ One outbound query per call, bounded by a fixed timeout
/// - ✅ Restrict the transport to the requested family
///
/// ## Forbidden Capabilities
/// - ❌ Retry inside `resolve()` (the next scheduled pass is the retry)
/// - ❌ Cache an address across calls
/// - ❌ Touch DNS records
///
/// Every failure is reported as [`crate::Error::AddressUnavailable`] so the
/// reconciler can skip the family for this pass.
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Determine the current address for `family`
    ///
    /// # Returns
    ///
    /// - `Ok(ObservedAddress)`: an address valid for `family`
    /// - `Err(Error::AddressUnavailable)`: no valid address could be determined
    async fn resolve(&self, family: RecordFamily) -> Result<ObservedAddress>;

    /// Short name for logging
    fn source_name(&self) -> &'static str;
}
