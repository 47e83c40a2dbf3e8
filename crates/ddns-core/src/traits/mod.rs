//! Collaborator traits consumed by the reconciler
//!
//! - [`AddressSource`]: Determine the current public address of a family
//! - [`RecordDirectory`]: Query and mutate records at the DNS provider

pub mod address_source;
pub mod record_directory;

pub use address_source::AddressSource;
pub use record_directory::{
    Account, RecordDirectory, RecordLookupResult, RecordReadResult, ZoneLookupResult,
};
