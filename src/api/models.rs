//! Wire shapes exchanged with the portal backend
//!
//! Payloads are built by the planner and sent as-is. Blank optional text is
//! serialized as JSON `null`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::draft::forms::non_blank;
use crate::draft::{AdvertisementFields, AttachmentDraft, ChildKind, PartnerFields, RequestDetails, ServerId, SlotId};

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentPayload {
    pub file_base64: String,
    pub file_name: String,
    /// `None` when the attachment is nested in its owner's create call
    pub owner_id: Option<ServerId>,
    pub slot_id: SlotId,
}

impl AttachmentPayload {
    /// Wire form of a planned attachment; the owner must already be assigned
    /// unless the attachment is nested
    pub fn from_draft(draft: &AttachmentDraft) -> Self {
        Self {
            file_base64: draft.file.to_base64(),
            file_name: draft.file.file_name.clone(),
            owner_id: draft.owner.id(),
            slot_id: draft.slot_id,
        }
    }
}

impl fmt::Debug for AttachmentPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentPayload")
            .field("file_name", &self.file_name)
            .field("file_base64", &format_args!("<{} chars>", self.file_base64.len()))
            .field("owner_id", &self.owner_id)
            .field("slot_id", &self.slot_id)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerPayload {
    pub request_id: Option<ServerId>,
    pub name: String,
    pub partner_type: Option<i32>,
    pub license_number: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub contact_phone: Option<String>,
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentPayload>,
}

impl PartnerPayload {
    pub fn from_fields(fields: &PartnerFields, request_id: Option<ServerId>, attachments: Vec<AttachmentPayload>) -> Self {
        Self {
            request_id,
            name: fields.name.trim().to_string(),
            partner_type: fields.partner_type.map(|t| t.code()),
            license_number: non_blank(&fields.license_number),
            license_expiry: fields.license_expiry,
            contact_phone: non_blank(&fields.contact_phone),
            email: non_blank(&fields.email),
            attachments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementPayload {
    pub request_id: Option<ServerId>,
    pub title: String,
    pub ad_type_id: Option<i64>,
    pub channel_ids: Vec<i64>,
    pub content: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentPayload>,
}

impl AdvertisementPayload {
    pub fn from_fields(
        fields: &AdvertisementFields,
        request_id: Option<ServerId>,
        attachments: Vec<AttachmentPayload>,
    ) -> Self {
        Self {
            request_id,
            title: fields.title.trim().to_string(),
            ad_type_id: fields.ad_type_id,
            channel_ids: fields.channel_ids.clone(),
            content: non_blank(&fields.content),
            location: non_blank(&fields.location),
            start_date: fields.start_date,
            end_date: fields.end_date,
            attachments,
        }
    }
}

/// Payload of a child create or update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ChildPayload {
    Partner(PartnerPayload),
    Advertisement(AdvertisementPayload),
}

impl ChildPayload {
    pub fn kind(&self) -> ChildKind {
        match self {
            ChildPayload::Partner(_) => ChildKind::Partner,
            ChildPayload::Advertisement(_) => ChildKind::Advertisement,
        }
    }

    pub fn set_request_id(&mut self, id: ServerId) {
        match self {
            ChildPayload::Partner(p) => p.request_id = Some(id),
            ChildPayload::Advertisement(a) => a.request_id = Some(id),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ChildPayload::Partner(p) => &p.name,
            ChildPayload::Advertisement(a) => &a.title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    pub request_type: i32,
    pub is_draft: bool,
    pub title: String,
    pub description: Option<String>,
    pub event_type_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub target_group_ids: Vec<i64>,
    pub expected_attendees: Option<u32>,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
    /// Only populated on create; the update endpoint ignores nested children
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partners: Vec<PartnerPayload>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentPayload>,
}

impl RequestPayload {
    pub fn from_details(details: &RequestDetails, request_type: i32, is_draft: bool) -> Self {
        Self {
            request_type,
            is_draft,
            title: details.title.trim().to_string(),
            description: non_blank(&details.description),
            event_type_id: details.event_type_id,
            start_date: details.start_date,
            end_date: details.end_date,
            location: non_blank(&details.location),
            target_group_ids: details.target_group_ids.clone(),
            expected_attendees: details.expected_attendees,
            contact_phone: non_blank(&details.contact_phone),
            notes: non_blank(&details.notes),
            partners: Vec::new(),
            attachments: Vec::new(),
        }
    }
}

/// Response of the combined create call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRequest {
    pub id: ServerId,
    /// Ids of the nested partners, in payload order, when the backend returns them
    #[serde(default)]
    pub partner_ids: Vec<ServerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRecord {
    pub id: ServerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResource {
    pub id: ServerId,
    pub slot_id: SlotId,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerResource {
    pub id: ServerId,
    pub name: String,
    #[serde(default)]
    pub partner_type: Option<i32>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub license_expiry: Option<NaiveDate>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// `None` when the backend omits the list; `listAttachments` is used then
    #[serde(default)]
    pub attachments: Option<Vec<AttachmentResource>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementResource {
    pub id: ServerId,
    pub title: String,
    #[serde(default)]
    pub ad_type_id: Option<i64>,
    #[serde(default)]
    pub channel_ids: Vec<i64>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub attachments: Option<Vec<AttachmentResource>>,
}

/// A request as returned by `getById`, with its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResource {
    pub id: ServerId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub event_type_id: Option<i64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub target_group_ids: Vec<i64>,
    #[serde(default)]
    pub expected_attendees: Option<u32>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub partners: Vec<PartnerResource>,
    #[serde(default)]
    pub advertisements: Vec<AdvertisementResource>,
    #[serde(default)]
    pub attachments: Option<Vec<AttachmentResource>>,
}
