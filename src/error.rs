//! Error taxonomy for the draft engine

use thiserror::Error;

use crate::draft::{AttachmentCategory, ChildKind, LocalKey, ServerId, SlotId};
use crate::reconcile::Phase;
use crate::wizard::RuleId;

/// A step or field rule failed. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Rule(RuleId),

    #[error("{kind} data incomplete: {rule}")]
    ChildIncomplete { kind: ChildKind, rule: RuleId },

    #[error("Step {requested} does not exist (wizard has {total} steps)")]
    StepOutOfRange { requested: usize, total: usize },

    #[error("Already on the last step")]
    NoNextStep,

    #[error("Already on the first step")]
    NoPreviousStep,
}

impl ValidationError {
    /// The rule behind this error, if it is a rule violation
    pub fn rule(&self) -> Option<RuleId> {
        match self {
            ValidationError::Rule(rule) | ValidationError::ChildIncomplete { rule, .. } => Some(*rule),
            _ => None,
        }
    }
}

impl From<RuleId> for ValidationError {
    fn from(rule: RuleId) -> Self {
        ValidationError::Rule(rule)
    }
}

/// A selected file was refused; the slot keeps its prior state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachmentRejected {
    #[error("{file_name} is too large: {size} bytes (max: {max} bytes)")]
    TooLarge { file_name: String, size: usize, max: usize },

    #[error("{file_name} is empty")]
    EmptyFile { file_name: String },

    #[error("{file_name} has a disallowed extension: '{extension}'")]
    DisallowedExtension { file_name: String, extension: String },

    #[error("{file_name} has a disallowed content type: {content_type}")]
    DisallowedContentType { file_name: String, content_type: String },

    #[error("Slot {slot_id} is not configured for {category}")]
    UnknownSlot { category: AttachmentCategory, slot_id: SlotId },
}

/// Misuse of the draft APIs (caller bugs rather than user input problems)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Slot {slot_id} in {category} has no baseline attachment")]
    NoBaseline { category: AttachmentCategory, slot_id: SlotId },

    #[error("{kind} {server_id} was removed from this draft and cannot be added again")]
    DeletedChildReadded { kind: ChildKind, server_id: ServerId },

    #[error("{kind} {server_id} is already in this draft")]
    DuplicateChild { kind: ChildKind, server_id: ServerId },

    #[error("No {kind} with key {local_key} in this draft")]
    UnknownChild { kind: ChildKind, local_key: LocalKey },
}

/// One failed attachment/partner/advertisement call during submission
#[derive(Debug, Error)]
#[error("{phase}: {target} failed: {source:#}")]
pub struct SubResourceError {
    pub phase: Phase,
    pub target: String,
    #[source]
    pub source: anyhow::Error,
}

/// Why a submission did not complete
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("A submission is already in progress")]
    AlreadySaving,

    #[error("Draft is not valid: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Saving the request failed: {source:#}")]
    Parent {
        #[source]
        source: anyhow::Error,
        /// Sub-resource failures collected before the parent call
        warnings: Vec<SubResourceError>,
    },
}
