// # ddns-core
//
// Reconciliation engine for the Cloudflare DDNS daemon.
//
// ## Architecture Overview
//
// This library keeps one DNS record name pointed at the current public
// address of the host:
// - **AddressSource**: Trait for determining the current address of a family
// - **RecordDirectory**: Trait for querying and mutating provider records
// - **Reconciler**: Decides and executes the single action a family needs
// - **Scheduler**: Drives the reconciler once or on a fixed period
//
// ## Design Principles
//
// 1. **Live state only**: Every pass re-queries the address and the record
// 2. **One mutation per family per pass**: Create, update or delete, never more
// 3. **Contained failures**: A failing family never stops the pass or the loop
// 4. **Retry by schedule**: No in-pass retries; the next tick retries
// 5. **Library-First**: The daemon is a thin layer over this crate

pub mod address;
pub mod config;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod traits;
pub mod types;

// Re-export core types for convenience
pub use address::{AddressSpec, StaticAddressSource};
pub use config::{Credentials, DdnsConfig, ValidatedConfig};
pub use engine::{ConvergenceAction, FamilyOutcome, FamilyReport, PassReport, Reconciler};
pub use error::{Error, Result};
pub use scheduler::{IntervalTicker, Scheduler, Ticker};
pub use traits::{AddressSource, RecordDirectory};
pub use types::{
    Mode, ObservedAddress, ReconciliationTarget, RecordFamily, RecordPayload, RecordTypeSelector,
    RemoteRecordState, Ttl,
};
