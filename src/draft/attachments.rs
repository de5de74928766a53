//! Attachment slot state per category
//!
//! Every category (request documents, partner documents, advertisement
//! documents) owns an independent `CategorySlots`. `AttachmentSlotStore` is the
//! typed registry over the three categories; a category's slots are created on
//! first access.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::upload::{PendingFile, Preview, UploadPolicy};
use super::{ServerId, SlotId};
use crate::error::{AttachmentRejected, DraftError};

/// Named group of attachment slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttachmentCategory {
    Request,
    Partner,
    Advertisement,
}

impl AttachmentCategory {
    pub const ALL: [AttachmentCategory; 3] = [
        AttachmentCategory::Request,
        AttachmentCategory::Partner,
        AttachmentCategory::Advertisement,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AttachmentCategory::Request => "request documents",
            AttachmentCategory::Partner => "partner documents",
            AttachmentCategory::Advertisement => "advertisement documents",
        }
    }
}

impl fmt::Display for AttachmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One configured attachment requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDefinition {
    pub slot_id: SlotId,
    /// Locale code (e.g. "en", "ar") to display name
    #[serde(default)]
    pub display_names: BTreeMap<String, String>,
    #[serde(default)]
    pub is_mandatory: bool,
}

impl SlotDefinition {
    pub fn new(slot_id: SlotId, name: impl Into<String>, is_mandatory: bool) -> Self {
        let mut display_names = BTreeMap::new();
        display_names.insert("en".to_string(), name.into());
        Self {
            slot_id,
            display_names,
            is_mandatory,
        }
    }

    /// Name for `locale`, falling back to English and then the slot id
    pub fn display_name(&self, locale: &str) -> String {
        self.display_names
            .get(locale)
            .or_else(|| self.display_names.get("en"))
            .cloned()
            .unwrap_or_else(|| format!("slot {}", self.slot_id))
    }
}

/// An attachment the server already holds for this draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineAttachment {
    pub server_id: ServerId,
    pub path: String,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotState {
    pending: Option<PendingFile>,
    preview: Option<Preview>,
    baseline: Option<BaselineAttachment>,
}

impl SlotState {
    pub fn pending_file(&self) -> Option<&PendingFile> {
        self.pending.as_ref()
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    /// Baseline still visible to the user (not marked for deletion)
    pub fn baseline(&self) -> Option<&BaselineAttachment> {
        self.baseline.as_ref()
    }

    pub fn is_satisfied(&self) -> bool {
        self.pending.is_some() || self.baseline.is_some()
    }
}

/// Which server record an attachment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    /// Filled in by the planner (or by the server for nested creates)
    Unassigned,
    Request(ServerId),
    Partner(ServerId),
    Advertisement(ServerId),
}

impl Owner {
    pub fn id(&self) -> Option<ServerId> {
        match self {
            Owner::Unassigned => None,
            Owner::Request(id) | Owner::Partner(id) | Owner::Advertisement(id) => Some(*id),
        }
    }
}

/// A slot with a pending file, ready to be planned
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentDraft {
    pub category: AttachmentCategory,
    pub slot_id: SlotId,
    pub file: PendingFile,
    pub owner: Owner,
    /// Baseline id this file replaces, when the baseline was kept
    pub replaces: Option<ServerId>,
}

/// Slot definitions and state for one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySlots {
    category: AttachmentCategory,
    definitions: Vec<SlotDefinition>,
    slots: BTreeMap<SlotId, SlotState>,
    deleted: Vec<ServerId>,
}

impl CategorySlots {
    pub fn new(category: AttachmentCategory) -> Self {
        Self {
            category,
            definitions: Vec::new(),
            slots: BTreeMap::new(),
            deleted: Vec::new(),
        }
    }

    pub fn category(&self) -> AttachmentCategory {
        self.category
    }

    /// Replace the slot definitions. Pending files for slots that are no
    /// longer defined are dropped; baselines are kept because the server
    /// still holds them.
    pub fn configure(&mut self, definitions: Vec<SlotDefinition>) {
        self.slots.retain(|slot_id, state| {
            if definitions.iter().any(|d| d.slot_id == *slot_id) {
                return true;
            }
            if state.pending.is_some() {
                debug!("Dropping pending file for undefined slot {} in {}", slot_id, self.category);
                state.pending = None;
                state.preview = None;
            }
            state.baseline.is_some()
        });
        self.definitions = definitions;
    }

    pub fn definitions(&self) -> &[SlotDefinition] {
        &self.definitions
    }

    pub fn definition(&self, slot_id: SlotId) -> Option<&SlotDefinition> {
        self.definitions.iter().find(|d| d.slot_id == slot_id)
    }

    pub fn slot(&self, slot_id: SlotId) -> Option<&SlotState> {
        self.slots.get(&slot_id)
    }

    /// Validate and store a file for a slot, replacing any earlier selection.
    /// On rejection the slot keeps its prior state.
    pub fn select_file(&mut self, slot_id: SlotId, file: PendingFile, policy: &UploadPolicy) -> Result<(), AttachmentRejected> {
        if self.definition(slot_id).is_none() {
            return Err(AttachmentRejected::UnknownSlot {
                category: self.category,
                slot_id,
            });
        }
        policy.validate(&file)?;

        debug!("Selected {} ({} bytes) for slot {} in {}", file.file_name, file.size(), slot_id, self.category);
        let preview = Preview::derive(&file);
        let state = self.slots.entry(slot_id).or_default();
        state.pending = Some(file);
        state.preview = Some(preview);
        Ok(())
    }

    /// Drop the pending file of a slot without touching its baseline
    pub fn clear_selection(&mut self, slot_id: SlotId) -> Option<PendingFile> {
        let state = self.slots.get_mut(&slot_id)?;
        state.preview = None;
        state.pending.take()
    }

    /// Record a server-held attachment as the slot's baseline
    pub fn load_baseline(&mut self, slot_id: SlotId, baseline: BaselineAttachment) {
        self.slots.entry(slot_id).or_default().baseline = Some(baseline);
    }

    /// Move the slot's baseline into the deletion set. A pending file, if
    /// any, stays and will be created rather than treated as an update.
    pub fn mark_baseline_for_deletion(&mut self, slot_id: SlotId) -> Result<ServerId, DraftError> {
        let baseline = self
            .slots
            .get_mut(&slot_id)
            .and_then(|state| state.baseline.take())
            .ok_or(DraftError::NoBaseline {
                category: self.category,
                slot_id,
            })?;

        debug!("Marked attachment {} (slot {}) for deletion in {}", baseline.server_id, slot_id, self.category);
        if !self.deleted.contains(&baseline.server_id) {
            self.deleted.push(baseline.server_id);
        }
        Ok(baseline.server_id)
    }

    pub fn is_mandatory_satisfied(&self) -> bool {
        self.missing_mandatory().is_empty()
    }

    /// Mandatory slots with neither a pending file nor a kept baseline
    pub fn missing_mandatory(&self) -> Vec<SlotId> {
        self.definitions
            .iter()
            .filter(|d| d.is_mandatory)
            .filter(|d| !self.slots.get(&d.slot_id).is_some_and(SlotState::is_satisfied))
            .map(|d| d.slot_id)
            .collect()
    }

    /// Slots holding a pending file, owner not yet assigned
    pub fn valid_attachments(&self) -> Vec<AttachmentDraft> {
        self.slots
            .iter()
            .filter_map(|(slot_id, state)| {
                let file = state.pending.as_ref()?;
                Some(AttachmentDraft {
                    category: self.category,
                    slot_id: *slot_id,
                    file: file.clone(),
                    owner: Owner::Unassigned,
                    replaces: state.baseline.as_ref().map(|b| b.server_id),
                })
            })
            .collect()
    }

    pub fn pending_deletions(&self) -> &[ServerId] {
        &self.deleted
    }

    pub fn has_selections(&self) -> bool {
        self.slots.values().any(|s| s.pending.is_some())
    }

    /// Hand the current selections over to a new owner (a committed child
    /// sub-form), leaving this category with its definitions and no files.
    pub fn take_selections(&mut self) -> CategorySlots {
        let mut taken = CategorySlots::new(self.category);
        taken.definitions = self.definitions.clone();
        for (slot_id, state) in self.slots.iter_mut() {
            if let Some(file) = state.pending.take() {
                taken.slots.insert(
                    *slot_id,
                    SlotState {
                        pending: Some(file),
                        preview: state.preview.take(),
                        baseline: None,
                    },
                );
            }
        }
        self.slots.retain(|_, state| state.baseline.is_some());
        taken
    }
}

/// Typed registry of the per-category slot stores of one draft
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentSlotStore {
    policy: UploadPolicy,
    request: Option<CategorySlots>,
    partner: Option<CategorySlots>,
    advertisement: Option<CategorySlots>,
}

impl AttachmentSlotStore {
    pub fn new(policy: UploadPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Slots of a category, created on first access
    pub fn slots_mut(&mut self, category: AttachmentCategory) -> &mut CategorySlots {
        let cell = match category {
            AttachmentCategory::Request => &mut self.request,
            AttachmentCategory::Partner => &mut self.partner,
            AttachmentCategory::Advertisement => &mut self.advertisement,
        };
        cell.get_or_insert_with(|| CategorySlots::new(category))
    }

    pub fn slots(&self, category: AttachmentCategory) -> Option<&CategorySlots> {
        match category {
            AttachmentCategory::Request => self.request.as_ref(),
            AttachmentCategory::Partner => self.partner.as_ref(),
            AttachmentCategory::Advertisement => self.advertisement.as_ref(),
        }
    }

    pub fn configure(&mut self, category: AttachmentCategory, definitions: Vec<SlotDefinition>) {
        self.slots_mut(category).configure(definitions);
    }

    pub fn select_file(&mut self, category: AttachmentCategory, slot_id: SlotId, file: PendingFile) -> Result<(), AttachmentRejected> {
        let policy = self.policy.clone();
        self.slots_mut(category).select_file(slot_id, file, &policy)
    }

    pub fn clear_selection(&mut self, category: AttachmentCategory, slot_id: SlotId) -> Option<PendingFile> {
        self.slots_mut(category).clear_selection(slot_id)
    }

    pub fn mark_baseline_for_deletion(&mut self, category: AttachmentCategory, slot_id: SlotId) -> Result<ServerId, DraftError> {
        self.slots_mut(category).mark_baseline_for_deletion(slot_id)
    }

    /// An unconfigured category has no mandatory slots
    pub fn is_mandatory_satisfied(&self, category: AttachmentCategory) -> bool {
        self.slots(category).is_none_or(CategorySlots::is_mandatory_satisfied)
    }

    pub fn valid_attachments(&self, category: AttachmentCategory) -> Vec<AttachmentDraft> {
        self.slots(category).map(CategorySlots::valid_attachments).unwrap_or_default()
    }

    pub fn pending_deletions(&self, category: AttachmentCategory) -> &[ServerId] {
        self.slots(category).map(CategorySlots::pending_deletions).unwrap_or(&[])
    }

    pub fn has_selections(&self, category: AttachmentCategory) -> bool {
        self.slots(category).is_some_and(CategorySlots::has_selections)
    }

    pub fn take_selections(&mut self, category: AttachmentCategory) -> CategorySlots {
        self.slots_mut(category).take_selections()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str) -> PendingFile {
        PendingFile::new(name, "application/pdf", vec![7; 64])
    }

    fn baseline(id: ServerId) -> BaselineAttachment {
        BaselineAttachment {
            server_id: id,
            path: format!("/files/{}.pdf", id),
            last_modified: None,
        }
    }

    fn configured_store() -> AttachmentSlotStore {
        let mut store = AttachmentSlotStore::default();
        store.configure(
            AttachmentCategory::Request,
            vec![
                SlotDefinition::new(1, "Trade license", true),
                SlotDefinition::new(2, "Site plan", true),
                SlotDefinition::new(3, "Other", false),
            ],
        );
        store
    }

    #[test]
    fn test_mandatory_satisfaction_tracks_files_and_baselines() {
        let mut store = configured_store();
        assert!(!store.is_mandatory_satisfied(AttachmentCategory::Request));

        store.select_file(AttachmentCategory::Request, 1, pdf("license.pdf")).unwrap();
        store.slots_mut(AttachmentCategory::Request).load_baseline(2, baseline(20));
        assert!(store.is_mandatory_satisfied(AttachmentCategory::Request));

        store.mark_baseline_for_deletion(AttachmentCategory::Request, 2).unwrap();
        assert!(!store.is_mandatory_satisfied(AttachmentCategory::Request));
        assert_eq!(store.slots(AttachmentCategory::Request).unwrap().missing_mandatory(), vec![2]);
        assert_eq!(store.pending_deletions(AttachmentCategory::Request), &[20]);
    }

    #[test]
    fn test_unconfigured_category_is_satisfied() {
        let store = AttachmentSlotStore::default();
        assert!(store.is_mandatory_satisfied(AttachmentCategory::Advertisement));
        assert!(store.valid_attachments(AttachmentCategory::Advertisement).is_empty());
    }

    #[test]
    fn test_rejected_file_keeps_prior_selection() {
        let mut store = configured_store();
        store.select_file(AttachmentCategory::Request, 1, pdf("first.pdf")).unwrap();

        let huge = PendingFile::new("huge.pdf", "application/pdf", vec![0; 6 * 1024 * 1024]);
        let err = store.select_file(AttachmentCategory::Request, 1, huge).unwrap_err();
        assert!(matches!(err, AttachmentRejected::TooLarge { .. }));

        let slot = store.slots(AttachmentCategory::Request).unwrap().slot(1).unwrap();
        assert_eq!(slot.pending_file().unwrap().file_name, "first.pdf");
    }

    #[test]
    fn test_clear_selection_keeps_baseline() {
        let mut store = configured_store();
        store.slots_mut(AttachmentCategory::Request).load_baseline(2, baseline(20));
        store.select_file(AttachmentCategory::Request, 2, pdf("plan-v2.pdf")).unwrap();

        let cleared = store.clear_selection(AttachmentCategory::Request, 2).unwrap();
        assert_eq!(cleared.file_name, "plan-v2.pdf");

        let slot = store.slots(AttachmentCategory::Request).unwrap().slot(2).unwrap();
        assert!(slot.pending_file().is_none());
        assert!(slot.preview().is_none());
        assert_eq!(slot.baseline().map(|b| b.server_id), Some(20));
        assert!(store.valid_attachments(AttachmentCategory::Request).is_empty());
    }

    #[test]
    fn test_select_file_rejects_unknown_slot() {
        let mut store = configured_store();
        let err = store.select_file(AttachmentCategory::Request, 99, pdf("x.pdf")).unwrap_err();
        assert!(matches!(err, AttachmentRejected::UnknownSlot { slot_id: 99, .. }));
    }

    #[test]
    fn test_mark_deletion_requires_baseline() {
        let mut store = configured_store();
        let err = store.mark_baseline_for_deletion(AttachmentCategory::Request, 1).unwrap_err();
        assert!(matches!(err, DraftError::NoBaseline { slot_id: 1, .. }));
    }

    #[test]
    fn test_valid_attachments_report_kept_baseline() {
        let mut store = configured_store();
        let slots = store.slots_mut(AttachmentCategory::Request);
        slots.load_baseline(1, baseline(10));
        slots.load_baseline(2, baseline(11));

        store.select_file(AttachmentCategory::Request, 1, pdf("new-license.pdf")).unwrap();
        store.select_file(AttachmentCategory::Request, 2, pdf("new-plan.pdf")).unwrap();
        store.mark_baseline_for_deletion(AttachmentCategory::Request, 2).unwrap();

        let valid = store.valid_attachments(AttachmentCategory::Request);
        assert_eq!(valid.len(), 2);
        assert_eq!(valid[0].replaces, Some(10));
        assert_eq!(valid[1].replaces, None);
        assert!(valid.iter().all(|a| a.owner == Owner::Unassigned));
    }

    #[test]
    fn test_configure_is_idempotent_and_drops_undefined_selections() {
        let mut store = configured_store();
        store.select_file(AttachmentCategory::Request, 3, pdf("other.pdf")).unwrap();
        store.select_file(AttachmentCategory::Request, 1, pdf("license.pdf")).unwrap();

        let definitions = store.slots(AttachmentCategory::Request).unwrap().definitions().to_vec();
        store.configure(AttachmentCategory::Request, definitions);
        assert_eq!(store.valid_attachments(AttachmentCategory::Request).len(), 2);

        store.configure(AttachmentCategory::Request, vec![SlotDefinition::new(1, "Trade license", true)]);
        let valid = store.valid_attachments(AttachmentCategory::Request);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].slot_id, 1);
        assert!(store.is_mandatory_satisfied(AttachmentCategory::Request));
    }

    #[test]
    fn test_take_selections_moves_files_out() {
        let mut store = AttachmentSlotStore::default();
        store.configure(AttachmentCategory::Partner, vec![SlotDefinition::new(5, "Partner license", true)]);
        store.select_file(AttachmentCategory::Partner, 5, pdf("partner.pdf")).unwrap();

        let taken = store.take_selections(AttachmentCategory::Partner);
        assert!(taken.is_mandatory_satisfied());
        assert_eq!(taken.valid_attachments().len(), 1);
        assert!(!store.has_selections(AttachmentCategory::Partner));
        assert!(!store.is_mandatory_satisfied(AttachmentCategory::Partner));
    }

    #[test]
    fn test_display_name_falls_back_to_english() {
        let mut definition = SlotDefinition::new(4, "Insurance", false);
        definition.display_names.insert("ar".to_string(), "تأمين".to_string());

        assert_eq!(definition.display_name("ar"), "تأمين");
        assert_eq!(definition.display_name("fr"), "Insurance");
    }
}
