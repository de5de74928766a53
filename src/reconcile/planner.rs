//! Diffs a draft against its baseline into an ordered list of backend calls
//!
//! Create mode is one combined request call followed by the advertisement
//! creates. Update mode walks the fixed phase order: attachment deletes,
//! attachment saves, partner deletes, partner creates, advertisement
//! deletes, advertisement saves, then the request update.

use log::{debug, info};
use serde::Serialize;

use super::operation::{Operation, Phase};
use crate::api::{AdvertisementPayload, AttachmentPayload, ChildPayload, PartnerPayload, RequestPayload};
use crate::draft::{AttachmentCategory, AttachmentDraft, CategorySlots, ChildKind, Owner, ParentMode, ServerId, WizardDraft};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationPlan {
    pub mode: ParentMode,
    pub operations: Vec<Operation>,
}

impl ReconciliationPlan {
    /// Operations grouped by phase, in execution order
    pub fn phases(&self) -> Vec<(Phase, Vec<&Operation>)> {
        let mut phases: Vec<(Phase, Vec<&Operation>)> = Vec::new();
        for op in &self.operations {
            match phases.last_mut() {
                Some((phase, ops)) if *phase == op.phase() => ops.push(op),
                _ => phases.push((op.phase(), vec![op])),
            }
        }
        phases
    }

    pub fn count(&self, phase: Phase) -> usize {
        self.operations.iter().filter(|op| op.phase() == phase).count()
    }

    pub fn parent(&self) -> Option<&Operation> {
        self.operations.iter().find(|op| op.is_parent())
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

pub fn plan(draft: &WizardDraft) -> ReconciliationPlan {
    let mode = draft.mode();
    let operations = match mode {
        ParentMode::Create => plan_create(draft),
        ParentMode::Update(id) => plan_update(draft, id),
    };

    info!(
        "Planned {} operations for {} ({:?}, draft save: {})",
        operations.len(),
        draft.flow,
        mode,
        draft.is_draft_save
    );
    for op in &operations {
        debug!("  [{}] {}", op.phase(), op);
    }

    ReconciliationPlan { mode, operations }
}

fn plan_create(draft: &WizardDraft) -> Vec<Operation> {
    let mut payload = request_payload(draft);
    payload.partners = draft
        .partners
        .new_entities()
        .map(|p| PartnerPayload::from_fields(&p.fields, None, nested_attachments(&p.attachments)))
        .collect();
    payload.attachments = draft
        .attachments
        .valid_attachments(AttachmentCategory::Request)
        .iter()
        .map(AttachmentPayload::from_draft)
        .collect();

    let mut operations = vec![Operation::CreateRequest { payload }];

    // The request id is filled in once the parent exists
    operations.extend(draft.advertisements.new_entities().map(|ad| Operation::CreateChild {
        payload: ChildPayload::Advertisement(AdvertisementPayload::from_fields(
            &ad.fields,
            None,
            nested_attachments(&ad.attachments),
        )),
    }));

    operations
}

fn plan_update(draft: &WizardDraft, request_id: ServerId) -> Vec<Operation> {
    let mut operations = Vec::new();

    // Attachment deletes: request documents, then documents of kept children
    operations.extend(attachment_deletes(
        AttachmentCategory::Request,
        draft.attachments.pending_deletions(AttachmentCategory::Request),
    ));
    for partner in draft.partners.entities_pending_update() {
        operations.extend(attachment_deletes(
            AttachmentCategory::Partner,
            partner.attachments.pending_deletions(),
        ));
    }
    for ad in draft.advertisements.entities_pending_update() {
        operations.extend(attachment_deletes(
            AttachmentCategory::Advertisement,
            ad.attachments.pending_deletions(),
        ));
    }

    // Attachment saves. Existing partners have no update call, so their new
    // files are sent here; existing advertisements embed new files in their
    // own update and only send replacements here.
    operations.extend(
        draft
            .attachments
            .valid_attachments(AttachmentCategory::Request)
            .into_iter()
            .map(|a| attachment_upsert(a, Owner::Request(request_id))),
    );
    for partner in draft.partners.entities_pending_update() {
        let Some(partner_id) = partner.server_id() else {
            continue;
        };
        operations.extend(
            partner
                .attachments
                .valid_attachments()
                .into_iter()
                .map(|a| attachment_upsert(a, Owner::Partner(partner_id))),
        );
    }
    for ad in draft.advertisements.entities_pending_update() {
        let Some(ad_id) = ad.server_id() else {
            continue;
        };
        operations.extend(
            ad.attachments
                .valid_attachments()
                .into_iter()
                .filter(|a| a.replaces.is_some())
                .map(|a| attachment_upsert(a, Owner::Advertisement(ad_id))),
        );
    }

    operations.extend(draft.partners.deleted_server_ids().iter().map(|id| Operation::DeleteChild {
        kind: ChildKind::Partner,
        id: *id,
    }));

    operations.extend(draft.partners.new_entities().map(|p| Operation::CreateChild {
        payload: ChildPayload::Partner(PartnerPayload::from_fields(
            &p.fields,
            Some(request_id),
            nested_attachments(&p.attachments),
        )),
    }));

    operations.extend(
        draft
            .advertisements
            .deleted_server_ids()
            .iter()
            .map(|id| Operation::DeleteChild {
                kind: ChildKind::Advertisement,
                id: *id,
            }),
    );

    operations.extend(draft.advertisements.new_entities().map(|ad| Operation::CreateChild {
        payload: ChildPayload::Advertisement(AdvertisementPayload::from_fields(
            &ad.fields,
            Some(request_id),
            nested_attachments(&ad.attachments),
        )),
    }));
    for ad in draft.advertisements.entities_pending_update() {
        let Some(ad_id) = ad.server_id() else {
            continue;
        };
        let new_files = ad
            .attachments
            .valid_attachments()
            .into_iter()
            .filter(|a| a.replaces.is_none())
            .map(|a| AttachmentPayload::from_draft(&with_owner(a, Owner::Advertisement(ad_id))))
            .collect();
        operations.push(Operation::UpdateAdvertisement {
            id: ad_id,
            payload: AdvertisementPayload::from_fields(&ad.fields, Some(request_id), new_files),
        });
    }

    operations.push(Operation::UpdateRequest {
        id: request_id,
        payload: request_payload(draft),
    });

    operations
}

fn request_payload(draft: &WizardDraft) -> RequestPayload {
    RequestPayload::from_details(&draft.details, draft.flow.request_type_code(), draft.is_draft_save)
}

/// Files of a child created in the same call; the server assigns the owner
fn nested_attachments(slots: &CategorySlots) -> Vec<AttachmentPayload> {
    slots
        .valid_attachments()
        .iter()
        .map(AttachmentPayload::from_draft)
        .collect()
}

fn attachment_deletes(category: AttachmentCategory, ids: &[ServerId]) -> impl Iterator<Item = Operation> + '_ {
    ids.iter().map(move |id| Operation::DeleteAttachment { category, id: *id })
}

fn with_owner(mut attachment: AttachmentDraft, owner: Owner) -> AttachmentDraft {
    attachment.owner = owner;
    attachment
}

/// A kept baseline makes the new file an update of that record; otherwise
/// the file is created
fn attachment_upsert(attachment: AttachmentDraft, owner: Owner) -> Operation {
    let attachment = with_owner(attachment, owner);
    let payload = AttachmentPayload::from_draft(&attachment);
    match attachment.replaces {
        Some(id) => Operation::UpdateAttachment {
            category: attachment.category,
            id,
            payload,
        },
        None => Operation::CreateAttachment {
            category: attachment.category,
            payload,
        },
    }
}
