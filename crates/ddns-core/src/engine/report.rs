//! Human-readable outcome of a pass

use crate::error::Error;
use crate::types::{Mode, RecordFamily};
use chrono::{DateTime, Utc};
use std::fmt;

/// What happened to one family in one pass
#[derive(Debug)]
pub enum FamilyOutcome {
    Created { address: String },
    Updated { previous: String, address: String },
    /// Record already holds the observed address
    Unchanged { address: String },
    Deleted { record_id: String },
    AlreadyAbsent,
    Failed(Error),
}

impl FamilyOutcome {
    /// Whether a mutating call was issued and succeeded
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            FamilyOutcome::Created { .. } | FamilyOutcome::Updated { .. } | FamilyOutcome::Deleted { .. }
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FamilyOutcome::Failed(_))
    }
}

impl fmt::Display for FamilyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FamilyOutcome::Created { address } => write!(f, "created ({})", address),
            FamilyOutcome::Updated { previous, address } => {
                write!(f, "updated ({} -> {})", previous, address)
            }
            FamilyOutcome::Unchanged { address } => write!(f, "unchanged ({})", address),
            FamilyOutcome::Deleted { record_id } => write!(f, "deleted (id {})", record_id),
            FamilyOutcome::AlreadyAbsent => f.write_str("already absent"),
            FamilyOutcome::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

#[derive(Debug)]
pub struct FamilyReport {
    pub family: RecordFamily,
    pub outcome: FamilyOutcome,
}

/// Outcomes of every family in one pass, in processing order
#[derive(Debug)]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    pub mode: Mode,
    pub families: Vec<FamilyReport>,
}

impl PassReport {
    pub fn new(mode: Mode) -> Self {
        Self {
            started_at: Utc::now(),
            mode,
            families: Vec::new(),
        }
    }

    /// Number of successful mutating calls
    pub fn mutations(&self) -> usize {
        self.families.iter().filter(|r| r.outcome.is_mutation()).count()
    }

    pub fn failures(&self) -> usize {
        self.families.iter().filter(|r| r.outcome.is_failure()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    /// Outcome for `family`, if it was part of the pass
    pub fn outcome(&self, family: RecordFamily) -> Option<&FamilyOutcome> {
        self.families
            .iter()
            .find(|r| r.family == family)
            .map(|r| &r.outcome)
    }
}
