//! TOML description of a wizard session
//!
//! A manifest lists what a user would enter across the wizard: the request
//! details, files per slot, children to add and existing children or
//! attachments to remove. Dates are quoted strings (`"2026-03-10"`).

use anyhow::{Context, Result, bail};
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::draft::{
    AdvertisementFields, AttachmentCategory, ChildKind, DraftLoader, PartnerFields, PendingFile, RequestDetails,
    RequestFlow, ServerId, SlotId, WizardDraft,
};
use crate::wizard::{BusinessRules, WizardStep, auto_commit};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileEntry {
    pub slot: SlotId,
    /// Relative paths resolve against the manifest's directory
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewPartner {
    #[serde(flatten)]
    pub fields: PartnerFields,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewAdvertisement {
    #[serde(flatten)]
    pub fields: AdvertisementFields,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// File changes on a partner or advertisement that already exists
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExistingChild {
    pub id: ServerId,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub remove_files: Vec<SlotId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DraftManifest {
    pub flow: RequestFlow,
    /// Set to edit an existing request
    #[serde(default)]
    pub request_id: Option<ServerId>,
    /// Replaces the loaded details when editing
    #[serde(default)]
    pub details: Option<RequestDetails>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub remove_files: Vec<SlotId>,
    #[serde(default)]
    pub partners: Vec<NewPartner>,
    #[serde(default)]
    pub remove_partners: Vec<ServerId>,
    #[serde(default)]
    pub existing_partners: Vec<ExistingChild>,
    #[serde(default)]
    pub advertisements: Vec<NewAdvertisement>,
    #[serde(default)]
    pub remove_advertisements: Vec<ServerId>,
    #[serde(default)]
    pub existing_advertisements: Vec<ExistingChild>,
}

impl DraftManifest {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let manifest: DraftManifest =
            toml::from_str(&content).with_context(|| format!("Failed to parse manifest: {}", path.display()))?;
        debug!("Parsed {} manifest from {}", manifest.flow, path.display());
        Ok(manifest)
    }

    fn touches_advertisements(&self) -> bool {
        !self.advertisements.is_empty()
            || !self.remove_advertisements.is_empty()
            || !self.existing_advertisements.is_empty()
    }

    /// Start a draft (new or loaded for edit) and apply the manifest to it
    pub async fn build(
        &self,
        loader: &DraftLoader,
        base_dir: &Path,
        rules: &BusinessRules,
    ) -> Result<WizardDraft> {
        let mut draft = match self.request_id {
            Some(id) => loader.load_for_edit(self.flow, id).await?,
            None => loader.new_draft(self.flow).await?,
        };
        self.apply(&mut draft, base_dir, rules)?;
        Ok(draft)
    }

    /// Replay the manifest onto a draft the way a user would fill the wizard.
    /// Each listed child goes through its sub-form and is committed as the
    /// wizard does when leaving the step.
    pub fn apply(&self, draft: &mut WizardDraft, base_dir: &Path, rules: &BusinessRules) -> Result<()> {
        if draft.flow != self.flow {
            bail!("Manifest is for a {} but the draft is a {}", self.flow, draft.flow);
        }
        if self.touches_advertisements() && !self.flow.uses_advertisements() {
            bail!("A {} has no advertisements step", self.flow);
        }

        if let Some(details) = &self.details {
            draft.details = details.clone();
        }

        for slot in &self.remove_files {
            draft
                .attachments
                .mark_baseline_for_deletion(AttachmentCategory::Request, *slot)?;
        }
        for entry in &self.files {
            let file = read_file(base_dir, entry)?;
            draft
                .attachments
                .select_file(AttachmentCategory::Request, entry.slot, file)?;
        }

        for id in &self.remove_partners {
            let key = draft
                .partners
                .find_by_server_id(*id)
                .map(|p| p.local_key())
                .with_context(|| format!("Partner {} is not part of this request", id))?;
            draft.partners.remove(key)?;
        }
        for id in &self.remove_advertisements {
            let key = draft
                .advertisements
                .find_by_server_id(*id)
                .map(|a| a.local_key())
                .with_context(|| format!("Advertisement {} is not part of this request", id))?;
            draft.advertisements.remove(key)?;
        }

        for existing in &self.existing_partners {
            apply_existing(draft, ChildKind::Partner, existing, base_dir)?;
        }
        for existing in &self.existing_advertisements {
            apply_existing(draft, ChildKind::Advertisement, existing, base_dir)?;
        }

        for partner in &self.partners {
            draft.partner_form = partner.fields.clone();
            for entry in &partner.files {
                let file = read_file(base_dir, entry)?;
                draft
                    .attachments
                    .select_file(AttachmentCategory::Partner, entry.slot, file)?;
            }
            auto_commit(WizardStep::Partners, draft, rules)
                .with_context(|| format!("Partner '{}' cannot be added", partner.fields.name))?;
        }

        for ad in &self.advertisements {
            draft.advertisement_form = ad.fields.clone();
            for entry in &ad.files {
                let file = read_file(base_dir, entry)?;
                draft
                    .attachments
                    .select_file(AttachmentCategory::Advertisement, entry.slot, file)?;
            }
            auto_commit(WizardStep::Advertisements, draft, rules)
                .with_context(|| format!("Advertisement '{}' cannot be added", ad.fields.title))?;
        }

        info!(
            "Applied manifest: {} partners, {} advertisements in draft",
            draft.partners.len(),
            draft.advertisements.len()
        );
        Ok(())
    }
}

fn read_file(base_dir: &Path, entry: &FileEntry) -> Result<PendingFile> {
    let path = if entry.path.is_absolute() {
        entry.path.clone()
    } else {
        base_dir.join(&entry.path)
    };
    PendingFile::from_path(&path)
}

fn apply_existing(draft: &mut WizardDraft, kind: ChildKind, existing: &ExistingChild, base_dir: &Path) -> Result<()> {
    let policy = draft.attachments.policy().clone();
    let slots = match kind {
        ChildKind::Partner => {
            let key = draft
                .partners
                .find_by_server_id(existing.id)
                .map(|p| p.local_key())
                .with_context(|| format!("Partner {} is not part of this request", existing.id))?;
            draft.partners.get_mut(key).map(|p| &mut p.attachments)
        }
        ChildKind::Advertisement => {
            let key = draft
                .advertisements
                .find_by_server_id(existing.id)
                .map(|a| a.local_key())
                .with_context(|| format!("Advertisement {} is not part of this request", existing.id))?;
            draft.advertisements.get_mut(key).map(|a| &mut a.attachments)
        }
    }
    .with_context(|| format!("{} {} disappeared from the draft", kind, existing.id))?;

    for slot in &existing.remove_files {
        slots.mark_baseline_for_deletion(*slot)?;
    }
    for entry in &existing.files {
        let file = read_file(base_dir, entry)?;
        slots.select_file(entry.slot, file, &policy)?;
    }
    Ok(())
}
