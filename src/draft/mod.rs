//! The in-memory draft a wizard session edits
//!
//! `WizardDraft` is the aggregate root: the step forms, the attachment slot
//! registry, the two child trackers and the parent identity. Validators, the
//! planner and the orchestrator all receive it explicitly.

pub mod attachments;
pub mod children;
pub mod forms;
pub mod loader;
pub mod upload;

pub use attachments::{
    AttachmentCategory, AttachmentDraft, AttachmentSlotStore, BaselineAttachment, CategorySlots, Owner, SlotDefinition,
    SlotState,
};
pub use children::{Advertisement, ChildCollectionTracker, ChildEntity, ChildFields, ChildKind, LocalKey, Partner};
pub use forms::{AdvertisementFields, PartnerFields, PartnerType, RequestDetails};
pub use loader::DraftLoader;
pub use upload::{FileIcon, PendingFile, Preview, UploadPolicy};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::wizard::WizardStep;

/// Server-assigned record id
pub type ServerId = i64;

/// Attachment slot id from the slot configuration
pub type SlotId = i64;

/// The request wizards sharing this engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestFlow {
    CharityEventPermit,
    EventPermit,
    FastingTent,
}

impl RequestFlow {
    pub fn steps(&self) -> &'static [WizardStep] {
        match self {
            RequestFlow::CharityEventPermit => &[
                WizardStep::Details,
                WizardStep::Partners,
                WizardStep::Advertisements,
                WizardStep::Attachments,
                WizardStep::Review,
            ],
            RequestFlow::EventPermit | RequestFlow::FastingTent => &[
                WizardStep::Details,
                WizardStep::Partners,
                WizardStep::Attachments,
                WizardStep::Review,
            ],
        }
    }

    pub fn uses_advertisements(&self) -> bool {
        self.steps().contains(&WizardStep::Advertisements)
    }

    /// Attachment categories this flow configures
    pub fn categories(&self) -> Vec<AttachmentCategory> {
        let mut categories = vec![AttachmentCategory::Request, AttachmentCategory::Partner];
        if self.uses_advertisements() {
            categories.push(AttachmentCategory::Advertisement);
        }
        categories
    }

    /// Category code the attachment configuration service is queried with
    pub fn category_code(&self, category: AttachmentCategory) -> &'static str {
        match (category, self) {
            (AttachmentCategory::Request, RequestFlow::CharityEventPermit) => "CharityEventPermit",
            (AttachmentCategory::Request, RequestFlow::EventPermit) => "EventPermit",
            (AttachmentCategory::Request, RequestFlow::FastingTent) => "FastingTent",
            (AttachmentCategory::Partner, _) => "Partner",
            (AttachmentCategory::Advertisement, _) => "Advertisement",
        }
    }

    pub fn request_type_code(&self) -> i32 {
        match self {
            RequestFlow::CharityEventPermit => 1,
            RequestFlow::EventPermit => 2,
            RequestFlow::FastingTent => 3,
        }
    }
}

impl fmt::Display for RequestFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestFlow::CharityEventPermit => "charity event permit",
            RequestFlow::EventPermit => "event permit",
            RequestFlow::FastingTent => "fasting tent",
        };
        f.write_str(name)
    }
}

/// Whether submission creates the parent request or updates it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentMode {
    Create,
    Update(ServerId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WizardDraft {
    pub flow: RequestFlow,
    pub details: RequestDetails,
    /// In-progress partner sub-form; its files live in the partner category
    pub partner_form: PartnerFields,
    /// In-progress advertisement sub-form; its files live in the advertisement category
    pub advertisement_form: AdvertisementFields,
    pub attachments: AttachmentSlotStore,
    pub partners: ChildCollectionTracker<PartnerFields>,
    pub advertisements: ChildCollectionTracker<AdvertisementFields>,
    parent_server_id: Option<ServerId>,
    /// Partial ("save as draft") submission rather than a final one
    pub is_draft_save: bool,
}

impl WizardDraft {
    /// Empty draft for create mode
    pub fn new(flow: RequestFlow, policy: UploadPolicy) -> Self {
        Self {
            flow,
            details: RequestDetails::default(),
            partner_form: PartnerFields::default(),
            advertisement_form: AdvertisementFields::default(),
            attachments: AttachmentSlotStore::new(policy),
            partners: ChildCollectionTracker::new(),
            advertisements: ChildCollectionTracker::new(),
            parent_server_id: None,
            is_draft_save: false,
        }
    }

    /// Empty draft for update mode, to be hydrated with the server baseline
    pub fn for_update(flow: RequestFlow, parent_server_id: ServerId, policy: UploadPolicy) -> Self {
        Self {
            parent_server_id: Some(parent_server_id),
            ..Self::new(flow, policy)
        }
    }

    pub fn parent_server_id(&self) -> Option<ServerId> {
        self.parent_server_id
    }

    pub fn mode(&self) -> ParentMode {
        match self.parent_server_id {
            Some(id) => ParentMode::Update(id),
            None => ParentMode::Create,
        }
    }

    /// True when the sub-form of `kind` has no field and no selected file
    pub fn sub_form_is_blank(&self, kind: ChildKind) -> bool {
        let fields_blank = match kind {
            ChildKind::Partner => self.partner_form.is_blank(),
            ChildKind::Advertisement => self.advertisement_form.is_blank(),
        };
        fields_blank && !self.attachments.has_selections(kind.attachment_category())
    }

    /// Move the partner sub-form (fields and selected files) into the
    /// tracker as a new partner and clear the sub-form. Validation is the
    /// caller's job.
    pub fn commit_partner_form(&mut self) -> LocalKey {
        let fields = std::mem::take(&mut self.partner_form);
        let files = self.attachments.take_selections(AttachmentCategory::Partner);
        self.partners.add_new(fields, files)
    }

    pub fn commit_advertisement_form(&mut self) -> LocalKey {
        let fields = std::mem::take(&mut self.advertisement_form);
        let files = self.attachments.take_selections(AttachmentCategory::Advertisement);
        self.advertisements.add_new(fields, files)
    }

    pub fn commit_sub_form(&mut self, kind: ChildKind) -> LocalKey {
        match kind {
            ChildKind::Partner => self.commit_partner_form(),
            ChildKind::Advertisement => self.commit_advertisement_form(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_follows_parent_id() {
        let draft = WizardDraft::new(RequestFlow::EventPermit, UploadPolicy::default());
        assert_eq!(draft.mode(), ParentMode::Create);

        let draft = WizardDraft::for_update(RequestFlow::EventPermit, 55, UploadPolicy::default());
        assert_eq!(draft.mode(), ParentMode::Update(55));
    }

    #[test]
    fn test_flow_steps_and_categories() {
        assert!(RequestFlow::CharityEventPermit.uses_advertisements());
        assert!(!RequestFlow::FastingTent.uses_advertisements());
        assert_eq!(RequestFlow::FastingTent.categories().len(), 2);
        assert_eq!(RequestFlow::EventPermit.category_code(AttachmentCategory::Request), "EventPermit");
    }

    #[test]
    fn test_commit_partner_form_clears_sub_form() {
        let mut draft = WizardDraft::new(RequestFlow::EventPermit, UploadPolicy::default());
        draft.attachments.configure(AttachmentCategory::Partner, vec![SlotDefinition::new(1, "License", false)]);
        draft.partner_form.name = "Gulf Catering".to_string();
        draft
            .attachments
            .select_file(AttachmentCategory::Partner, 1, PendingFile::new("l.pdf", "application/pdf", vec![1]))
            .unwrap();
        assert!(!draft.sub_form_is_blank(ChildKind::Partner));

        let key = draft.commit_partner_form();

        assert!(draft.sub_form_is_blank(ChildKind::Partner));
        let partner = draft.partners.get(key).unwrap();
        assert_eq!(partner.fields.name, "Gulf Catering");
        assert_eq!(partner.attachments.valid_attachments().len(), 1);
    }
}
