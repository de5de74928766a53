//! Planned backend calls and the phases they run in

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::{AdvertisementPayload, AttachmentPayload, ChildPayload, RequestPayload};
use crate::draft::{AttachmentCategory, ChildKind, ServerId};

/// Execution phase of a submission. Calls within a phase are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    DeletingAttachments,
    SavingAttachments,
    DeletingPartners,
    CreatingPartners,
    DeletingAdvertisements,
    SavingAdvertisements,
    CreatingRequest,
    UpdatingRequest,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::DeletingAttachments => "Deleting Attachments",
            Phase::SavingAttachments => "Saving Attachments",
            Phase::DeletingPartners => "Deleting Partners",
            Phase::CreatingPartners => "Creating Partners",
            Phase::DeletingAdvertisements => "Deleting Advertisements",
            Phase::SavingAdvertisements => "Saving Advertisements",
            Phase::CreatingRequest => "Creating Request",
            Phase::UpdatingRequest => "Updating Request",
        }
    }

    /// A failure in a parent phase fails the whole submission
    pub fn is_parent(&self) -> bool {
        matches!(self, Phase::CreatingRequest | Phase::UpdatingRequest)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single backend call, with its payload ready to send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    DeleteAttachment {
        category: AttachmentCategory,
        id: ServerId,
    },
    CreateAttachment {
        category: AttachmentCategory,
        payload: AttachmentPayload,
    },
    /// Replace the file of an attachment whose baseline was kept
    UpdateAttachment {
        category: AttachmentCategory,
        id: ServerId,
        payload: AttachmentPayload,
    },
    DeleteChild {
        kind: ChildKind,
        id: ServerId,
    },
    /// New child with its attachments embedded
    CreateChild {
        payload: ChildPayload,
    },
    /// Full field set of an existing advertisement plus its new attachments.
    /// Partners have no update call.
    UpdateAdvertisement {
        id: ServerId,
        payload: AdvertisementPayload,
    },
    /// Combined create: new partners and request attachments are nested
    CreateRequest {
        payload: RequestPayload,
    },
    UpdateRequest {
        id: ServerId,
        payload: RequestPayload,
    },
}

impl Operation {
    pub fn phase(&self) -> Phase {
        match self {
            Self::DeleteAttachment { .. } => Phase::DeletingAttachments,
            Self::CreateAttachment { .. } | Self::UpdateAttachment { .. } => Phase::SavingAttachments,
            Self::DeleteChild {
                kind: ChildKind::Partner,
                ..
            } => Phase::DeletingPartners,
            Self::DeleteChild {
                kind: ChildKind::Advertisement,
                ..
            } => Phase::DeletingAdvertisements,
            Self::CreateChild {
                payload: ChildPayload::Partner(_),
            } => Phase::CreatingPartners,
            Self::CreateChild {
                payload: ChildPayload::Advertisement(_),
            }
            | Self::UpdateAdvertisement { .. } => Phase::SavingAdvertisements,
            Self::CreateRequest { .. } => Phase::CreatingRequest,
            Self::UpdateRequest { .. } => Phase::UpdatingRequest,
        }
    }

    pub fn operation_type(&self) -> &'static str {
        match self {
            Self::DeleteAttachment { .. } | Self::DeleteChild { .. } => "delete",
            Self::CreateAttachment { .. } | Self::CreateChild { .. } | Self::CreateRequest { .. } => "create",
            Self::UpdateAttachment { .. } | Self::UpdateAdvertisement { .. } | Self::UpdateRequest { .. } => "update",
        }
    }

    /// Human readable name of the record the call touches
    pub fn target(&self) -> String {
        match self {
            Self::DeleteAttachment { category, id } => format!("attachment {} ({})", id, category),
            Self::CreateAttachment { category, payload } => {
                format!("attachment '{}' for slot {} ({})", payload.file_name, payload.slot_id, category)
            }
            Self::UpdateAttachment { category, id, payload } => {
                format!("attachment {} with '{}' ({})", id, payload.file_name, category)
            }
            Self::DeleteChild { kind, id } => format!("{} {}", kind, id),
            Self::CreateChild { payload } => format!("{} '{}'", payload.kind(), payload.label()),
            Self::UpdateAdvertisement { id, payload } => format!("advertisement {} '{}'", id, payload.title),
            Self::CreateRequest { payload } => format!("request '{}'", payload.title),
            Self::UpdateRequest { id, .. } => format!("request {}", id),
        }
    }

    pub fn is_parent(&self) -> bool {
        self.phase().is_parent()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operation_type(), self.target())
    }
}
