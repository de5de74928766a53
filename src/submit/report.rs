//! Outcome of a submission

use crate::draft::{ParentMode, ServerId};
use crate::error::SubResourceError;
use crate::reconcile::{Operation, Phase};

/// One backend call issued during a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub phase: Phase,
    pub operation_type: &'static str,
    pub target: String,
    pub succeeded: bool,
    /// Id returned by a create call
    pub created_id: Option<ServerId>,
}

impl CallRecord {
    pub fn succeeded(op: &Operation, created_id: Option<ServerId>) -> Self {
        Self {
            phase: op.phase(),
            operation_type: op.operation_type(),
            target: op.target(),
            succeeded: true,
            created_id,
        }
    }

    pub fn failed(op: &Operation) -> Self {
        Self {
            succeeded: false,
            created_id: None,
            ..Self::succeeded(op, None)
        }
    }
}

/// A submission whose parent call succeeded. Failed sub-resource calls are
/// listed as warnings.
#[derive(Debug)]
pub struct SubmissionReport {
    pub request_id: ServerId,
    pub mode: ParentMode,
    pub calls: Vec<CallRecord>,
    pub warnings: Vec<SubResourceError>,
}

impl SubmissionReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn calls_in(&self, phase: Phase) -> impl Iterator<Item = &CallRecord> {
        self.calls.iter().filter(move |c| c.phase == phase)
    }

    pub fn failed_calls(&self) -> usize {
        self.calls.iter().filter(|c| !c.succeeded).count()
    }

    /// One-line summary used for notifications
    pub fn summary(&self) -> String {
        let verb = match self.mode {
            ParentMode::Create => "created",
            ParentMode::Update(_) => "updated",
        };
        if self.is_clean() {
            format!("Request {} {} ({} calls)", self.request_id, verb, self.calls.len())
        } else {
            format!(
                "Request {} {} with {} of {} calls failed",
                self.request_id,
                verb,
                self.warnings.len(),
                self.calls.len()
            )
        }
    }
}
