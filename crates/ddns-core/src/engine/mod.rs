//! Reconciliation engine
//!
//! The Reconciler is responsible for one pass over the families of a
//! [`ReconciliationTarget`]:
//! - Resolving the desired address via AddressSource (upsert only)
//! - Reading the current record via RecordDirectory
//! - Deciding the single action that converges the two
//! - Issuing at most one mutating call per family
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────┐
//!                  │  Scheduler   │
//!                  └──────────────┘
//!                         │ run_pass()
//!                         ▼
//!                  ┌──────────────┐
//!                  │  Reconciler  │──── for family in [A, AAAA]
//!                  └──────────────┘
//!                         │
//!         ┌───────────────┼────────────────┐
//!         ▼               ▼                ▼
//! ┌───────────────┐ ┌──────────────┐ ┌──────────────┐
//! │ AddressSource │ │ plan_upsert/ │ │ RecordDir.   │
//! │ (resolve)     │ │ plan_delete  │ │ (query/mut.) │
//! └───────────────┘ └──────────────┘ └──────────────┘
//! ```
//!
//! ## Failure containment
//!
//! Every error inside a family is turned into [`FamilyOutcome::Failed`];
//! the pass always continues with the next family.

pub mod plan;
pub mod report;

pub use plan::{ConvergenceAction, plan_delete, plan_upsert};
pub use report::{FamilyOutcome, FamilyReport, PassReport};

use crate::error::{Error, Result};
use crate::traits::{AddressSource, RecordDirectory, RecordLookupResult, RecordReadResult};
use crate::types::{Mode, ReconciliationTarget, RecordFamily, RemoteRecordState};
use tracing::{debug, error, info, warn};

/// Converges the remote record with the observed address, one pass at a time
///
/// The reconciler holds no state between passes: every pass queries the
/// address source and the provider afresh.
pub struct Reconciler {
    target: ReconciliationTarget,
    directory: Box<dyn RecordDirectory>,
    addresses: Box<dyn AddressSource>,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `target`: Record to converge
    /// - `directory`: Provider client
    /// - `addresses`: Source of the desired address (unused in delete mode)
    pub fn new(
        target: ReconciliationTarget,
        directory: Box<dyn RecordDirectory>,
        addresses: Box<dyn AddressSource>,
    ) -> Self {
        Self {
            target,
            directory,
            addresses,
        }
    }

    pub fn target(&self) -> &ReconciliationTarget {
        &self.target
    }

    /// Run one pass over every family of the target, in order
    ///
    /// Dispatches to upsert or delete by the target's mode. Never fails as a
    /// whole; per-family failures are inside the report.
    pub async fn run_pass(&self) -> PassReport {
        let mut report = PassReport::new(self.target.mode);

        for &family in self.target.families() {
            let outcome = match self.target.mode {
                Mode::Upsert => self.reconcile_upsert(family).await,
                Mode::Delete => self.reconcile_delete(family).await,
            };
            report.families.push(FamilyReport { family, outcome });
        }

        debug!(
            "Pass finished: {} mutation(s), {} failure(s)",
            report.mutations(),
            report.failures()
        );
        report
    }

    /// Create or update the `family` record so it holds the observed address
    pub async fn reconcile_upsert(&self, family: RecordFamily) -> FamilyOutcome {
        info!("Checking {} record...", family);

        match self.try_upsert(family).await {
            Ok(outcome) => {
                info!("{} record {}", family, outcome);
                outcome
            }
            Err(e) => {
                error!("{} record: {}", family, e);
                FamilyOutcome::Failed(e)
            }
        }
    }

    /// Remove the `family` record if it exists
    pub async fn reconcile_delete(&self, family: RecordFamily) -> FamilyOutcome {
        info!("Deleting {} record...", family);

        match self.try_delete(family).await {
            Ok(outcome) => {
                info!("{} record {}", family, outcome);
                outcome
            }
            Err(e) => {
                error!("{} record: {}", family, e);
                FamilyOutcome::Failed(e)
            }
        }
    }

    async fn try_upsert(&self, family: RecordFamily) -> Result<FamilyOutcome> {
        let observed = self.addresses.resolve(family).await?;
        info!("WAN IP: {} (via {})", observed, self.addresses.source_name());

        let remote = self.remote_state(family).await?;
        let action = plan_upsert(&self.target, &observed, &remote);

        let address = observed.as_str().to_string();
        let outcome = match (&action, remote) {
            (ConvergenceAction::NoOp, _) => FamilyOutcome::Unchanged { address },
            (_, RemoteRecordState::Present { content, .. }) => {
                info!("Current DNS: {}, updating record...", content);
                FamilyOutcome::Updated {
                    previous: content,
                    address,
                }
            }
            (_, RemoteRecordState::Absent) => {
                info!("Record does not exist, creating...");
                FamilyOutcome::Created { address }
            }
        };

        self.execute(&action).await?;
        Ok(outcome)
    }

    async fn try_delete(&self, family: RecordFamily) -> Result<FamilyOutcome> {
        let record_id = self.find_record(family).await?;
        let action = plan_delete(record_id.as_deref());

        let outcome = match record_id {
            None => FamilyOutcome::AlreadyAbsent,
            Some(record_id) => FamilyOutcome::Deleted { record_id },
        };

        self.execute(&action).await?;
        Ok(outcome)
    }

    /// Current state of the `family` record
    ///
    /// A found record is always followed by a content read; a failed read
    /// is an error so that nothing is mutated without confirmed content.
    async fn remote_state(&self, family: RecordFamily) -> Result<RemoteRecordState> {
        let Some(record_id) = self.find_record(family).await? else {
            return Ok(RemoteRecordState::Absent);
        };

        match self
            .directory
            .read_record_content(&self.target.zone_id, &record_id)
            .await?
        {
            RecordReadResult::Found(content) => {
                Ok(RemoteRecordState::Present { record_id, content })
            }
            RecordReadResult::NotFound => Err(Error::directory(format!(
                "record {} disappeared before its content could be read",
                record_id
            ))),
            RecordReadResult::Malformed(reason) => Err(Error::directory(format!(
                "failed to get DNS record {}: {}",
                record_id, reason
            ))),
        }
    }

    /// Identifier of the `family` record, `None` when absent
    async fn find_record(&self, family: RecordFamily) -> Result<Option<String>> {
        let lookup = self
            .directory
            .find_record(&self.target.zone_id, &self.target.record_name, family)
            .await?;

        match lookup {
            RecordLookupResult::Found {
                record_id,
                candidates,
            } => {
                if candidates > 1 {
                    warn!(
                        "{} {} records named {}, using the first ({})",
                        candidates, family, self.target.record_name, record_id
                    );
                }
                debug!("Record ID: {}", record_id);
                Ok(Some(record_id))
            }
            RecordLookupResult::NotFound => Ok(None),
            RecordLookupResult::Malformed(reason) => {
                Err(Error::directory(format!("record lookup: {}", reason)))
            }
        }
    }

    /// Issue the single mutating call an action needs
    async fn execute(&self, action: &ConvergenceAction) -> Result<()> {
        let zone_id = &self.target.zone_id;

        match action {
            ConvergenceAction::NoOp => Ok(()),
            ConvergenceAction::Create(payload) => {
                self.directory.create_record(zone_id, payload).await
            }
            ConvergenceAction::Update { record_id, payload } => {
                self.directory.update_record(zone_id, record_id, payload).await
            }
            ConvergenceAction::Delete { record_id } => {
                self.directory.delete_record(zone_id, record_id).await
            }
        }
    }
}
