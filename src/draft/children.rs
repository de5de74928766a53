//! Child entity collections (partners, advertisements)
//!
//! A tracker keeps the ordered list shown to the user together with the
//! server ids of existing children the user removed. Field values are never
//! diffed against the baseline: an existing child is always sent in full.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ServerId;
use super::attachments::{AttachmentCategory, CategorySlots};
use super::forms::{AdvertisementFields, PartnerFields};
use crate::error::DraftError;

/// Draft-local identity of a child, stable for the whole session
pub type LocalKey = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChildKind {
    Partner,
    Advertisement,
}

impl ChildKind {
    pub fn attachment_category(&self) -> AttachmentCategory {
        match self {
            ChildKind::Partner => AttachmentCategory::Partner,
            ChildKind::Advertisement => AttachmentCategory::Advertisement,
        }
    }

    /// The backend has no partner update endpoint; partners are only added or removed
    pub fn supports_update(&self) -> bool {
        matches!(self, ChildKind::Advertisement)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChildKind::Partner => "partner",
            ChildKind::Advertisement => "advertisement",
        }
    }
}

impl fmt::Display for ChildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub trait ChildFields: Clone + fmt::Debug {
    const KIND: ChildKind;

    fn is_blank(&self) -> bool;
}

impl ChildFields for PartnerFields {
    const KIND: ChildKind = ChildKind::Partner;

    fn is_blank(&self) -> bool {
        PartnerFields::is_blank(self)
    }
}

impl ChildFields for AdvertisementFields {
    const KIND: ChildKind = ChildKind::Advertisement;

    fn is_blank(&self) -> bool {
        AdvertisementFields::is_blank(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChildEntity<F> {
    local_key: LocalKey,
    server_id: Option<ServerId>,
    pub fields: F,
    pub attachments: CategorySlots,
}

impl<F: ChildFields> ChildEntity<F> {
    /// A child drafted in this session
    pub fn new(fields: F, attachments: CategorySlots) -> Self {
        Self {
            local_key: Uuid::new_v4(),
            server_id: None,
            fields,
            attachments,
        }
    }

    /// A child loaded from the server at edit start
    pub fn existing(server_id: ServerId, fields: F, attachments: CategorySlots) -> Self {
        Self {
            local_key: Uuid::new_v4(),
            server_id: Some(server_id),
            fields,
            attachments,
        }
    }

    pub fn local_key(&self) -> LocalKey {
        self.local_key
    }

    pub fn server_id(&self) -> Option<ServerId> {
        self.server_id
    }

    pub fn is_new(&self) -> bool {
        self.server_id.is_none()
    }
}

pub type Partner = ChildEntity<PartnerFields>;
pub type Advertisement = ChildEntity<AdvertisementFields>;

#[derive(Debug, Clone, PartialEq)]
pub struct ChildCollectionTracker<F> {
    display: Vec<ChildEntity<F>>,
    deleted_server_ids: Vec<ServerId>,
}

impl<F> Default for ChildCollectionTracker<F> {
    fn default() -> Self {
        Self {
            display: Vec::new(),
            deleted_server_ids: Vec::new(),
        }
    }
}

impl<F: ChildFields> ChildCollectionTracker<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child. An id that was already removed, or that is already
    /// displayed, is a caller bug and is refused.
    pub fn add(&mut self, entity: ChildEntity<F>) -> Result<LocalKey, DraftError> {
        if let Some(id) = entity.server_id {
            if self.deleted_server_ids.contains(&id) {
                return Err(DraftError::DeletedChildReadded { kind: F::KIND, server_id: id });
            }
            if self.display.iter().any(|e| e.server_id == Some(id)) {
                return Err(DraftError::DuplicateChild { kind: F::KIND, server_id: id });
            }
        }

        let key = entity.local_key;
        debug!("Adding {} {} (server id {:?})", F::KIND, key, entity.server_id);
        self.display.push(entity);
        Ok(key)
    }

    /// Append a child drafted in this session
    pub fn add_new(&mut self, fields: F, attachments: CategorySlots) -> LocalKey {
        let entity = ChildEntity::new(fields, attachments);
        let key = entity.local_key;
        debug!("Adding new {} {}", F::KIND, key);
        self.display.push(entity);
        key
    }

    /// Remove a child from the display list; an existing child's id is
    /// recorded for deletion in the same step.
    pub fn remove(&mut self, local_key: LocalKey) -> Result<ChildEntity<F>, DraftError> {
        let index = self
            .display
            .iter()
            .position(|e| e.local_key == local_key)
            .ok_or(DraftError::UnknownChild { kind: F::KIND, local_key })?;

        let entity = self.display.remove(index);
        if let Some(id) = entity.server_id {
            debug!("Recording {} {} for deletion", F::KIND, id);
            self.deleted_server_ids.push(id);
        }
        Ok(entity)
    }

    pub fn new_entities(&self) -> impl Iterator<Item = &ChildEntity<F>> {
        self.display.iter().filter(|e| e.is_new())
    }

    /// Existing children still displayed; sent with their full field set
    pub fn entities_pending_update(&self) -> impl Iterator<Item = &ChildEntity<F>> {
        self.display.iter().filter(|e| !e.is_new())
    }

    pub fn display(&self) -> &[ChildEntity<F>] {
        &self.display
    }

    pub fn deleted_server_ids(&self) -> &[ServerId] {
        &self.deleted_server_ids
    }

    pub fn get(&self, local_key: LocalKey) -> Option<&ChildEntity<F>> {
        self.display.iter().find(|e| e.local_key == local_key)
    }

    pub fn get_mut(&mut self, local_key: LocalKey) -> Option<&mut ChildEntity<F>> {
        self.display.iter_mut().find(|e| e.local_key == local_key)
    }

    pub fn find_by_server_id(&self, server_id: ServerId) -> Option<&ChildEntity<F>> {
        self.display.iter().find(|e| e.server_id == Some(server_id))
    }

    pub fn len(&self) -> usize {
        self.display.len()
    }

    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }
}
