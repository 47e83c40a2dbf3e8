//! Convergence decisions
//!
//! Pure functions from (target, observed address, remote state) to the one
//! action that brings the record in line. Nothing here performs I/O.

use crate::types::{ObservedAddress, ReconciliationTarget, RecordPayload, RemoteRecordState};

/// The mutating call a pass needs for one family, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvergenceAction {
    NoOp,
    Create(RecordPayload),
    Update {
        record_id: String,
        payload: RecordPayload,
    },
    Delete {
        record_id: String,
    },
}

impl ConvergenceAction {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, ConvergenceAction::NoOp)
    }
}

/// Decide the upsert action
///
/// Content comparison is exact string equality; `2001:db8::1` and
/// `2001:0db8::1` count as different.
pub fn plan_upsert(
    target: &ReconciliationTarget,
    observed: &ObservedAddress,
    remote: &RemoteRecordState,
) -> ConvergenceAction {
    match remote {
        RemoteRecordState::Absent => ConvergenceAction::Create(target.payload(observed)),
        RemoteRecordState::Present { content, .. } if content == observed.as_str() => {
            ConvergenceAction::NoOp
        }
        RemoteRecordState::Present { record_id, .. } => ConvergenceAction::Update {
            record_id: record_id.clone(),
            payload: target.payload(observed),
        },
    }
}

/// Decide the delete action
///
/// Deletion only needs the record identifier, so the content of a present
/// record is never read.
pub fn plan_delete(record_id: Option<&str>) -> ConvergenceAction {
    match record_id {
        None => ConvergenceAction::NoOp,
        Some(record_id) => ConvergenceAction::Delete {
            record_id: record_id.to_string(),
        },
    }
}
