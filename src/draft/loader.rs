//! Building drafts: empty for create mode, hydrated from the server for edits

use anyhow::{Context, Result};
use futures::future::join_all;
use log::{debug, info};
use std::collections::BTreeMap;

use super::attachments::{AttachmentCategory, BaselineAttachment, CategorySlots, SlotDefinition};
use super::children::ChildEntity;
use super::forms::{AdvertisementFields, PartnerFields, PartnerType, RequestDetails};
use super::upload::UploadPolicy;
use super::{RequestFlow, ServerId, WizardDraft};
use crate::api::{AdvertisementResource, AttachmentResource, PartnerResource, RequestResource, Services};

type Definitions = BTreeMap<AttachmentCategory, Vec<SlotDefinition>>;

pub struct DraftLoader {
    services: Services,
    policy: UploadPolicy,
}

impl DraftLoader {
    pub fn new(services: Services, policy: UploadPolicy) -> Self {
        Self { services, policy }
    }

    /// Slot definitions of every category the flow uses, fetched concurrently
    pub async fn slot_definitions(&self, flow: RequestFlow) -> Result<Definitions> {
        let categories = flow.categories();
        let results = join_all(categories.iter().map(|category| {
            self.services
                .attachments
                .configs_by_category(flow.category_code(*category))
        }))
        .await;

        categories
            .into_iter()
            .zip(results)
            .map(|(category, result)| {
                let definitions =
                    result.with_context(|| format!("Failed to load slot configuration for {}", category))?;
                debug!("{} slots configured for {}", definitions.len(), category);
                Ok::<_, anyhow::Error>((category, definitions))
            })
            .collect()
    }

    pub async fn new_draft(&self, flow: RequestFlow) -> Result<WizardDraft> {
        let definitions = self.slot_definitions(flow).await?;
        let mut draft = WizardDraft::new(flow, self.policy.clone());
        for (category, defs) in definitions {
            draft.attachments.configure(category, defs);
        }
        info!("Started new {} draft", flow);
        Ok(draft)
    }

    /// Hydrate an update-mode draft from the request and its children. The
    /// state loaded here is the baseline the planner diffs against.
    pub async fn load_for_edit(&self, flow: RequestFlow, request_id: ServerId) -> Result<WizardDraft> {
        let (definitions, resource) = futures::join!(
            self.slot_definitions(flow),
            self.services.requests.get_request(request_id)
        );
        let mut definitions = definitions?;
        let resource = resource.with_context(|| format!("Failed to load request {}", request_id))?;

        let mut draft = WizardDraft::for_update(flow, request_id, self.policy.clone());
        draft.details = details_from_resource(&resource);

        let request_defs = definitions.remove(&AttachmentCategory::Request).unwrap_or_default();
        let partner_defs = definitions.remove(&AttachmentCategory::Partner).unwrap_or_default();
        let advertisement_defs = definitions.remove(&AttachmentCategory::Advertisement).unwrap_or_default();

        let request_files = self
            .baseline_files(resource.attachments.clone(), request_id, flow, AttachmentCategory::Request)
            .await?;
        let slots = draft.attachments.slots_mut(AttachmentCategory::Request);
        slots.configure(request_defs);
        load_baselines(slots, request_files);

        // The sub-form categories only carry definitions; files of existing
        // children live in each child's own slots
        draft.attachments.configure(AttachmentCategory::Partner, partner_defs.clone());

        for partner in &resource.partners {
            let files = self
                .baseline_files(partner.attachments.clone(), partner.id, flow, AttachmentCategory::Partner)
                .await?;
            let mut slots = CategorySlots::new(AttachmentCategory::Partner);
            slots.configure(partner_defs.clone());
            load_baselines(&mut slots, files);
            draft
                .partners
                .add(ChildEntity::existing(partner.id, partner_fields(partner), slots))?;
        }

        if flow.uses_advertisements() {
            draft
                .attachments
                .configure(AttachmentCategory::Advertisement, advertisement_defs.clone());

            for ad in &resource.advertisements {
                let files = self
                    .baseline_files(ad.attachments.clone(), ad.id, flow, AttachmentCategory::Advertisement)
                    .await?;
                let mut slots = CategorySlots::new(AttachmentCategory::Advertisement);
                slots.configure(advertisement_defs.clone());
                load_baselines(&mut slots, files);
                draft
                    .advertisements
                    .add(ChildEntity::existing(ad.id, advertisement_fields(ad), slots))?;
            }
        }

        info!(
            "Loaded {} {} with {} partners and {} advertisements",
            flow,
            request_id,
            draft.partners.len(),
            draft.advertisements.len()
        );
        Ok(draft)
    }

    /// Attachments embedded in a resource, or listed by owner when omitted
    async fn baseline_files(
        &self,
        embedded: Option<Vec<AttachmentResource>>,
        owner_id: ServerId,
        flow: RequestFlow,
        category: AttachmentCategory,
    ) -> Result<Vec<AttachmentResource>> {
        if let Some(files) = embedded {
            return Ok(files);
        }

        debug!("No embedded attachments for owner {}; listing {}", owner_id, category);
        self.services
            .attachments
            .list_attachments(owner_id, flow.category_code(category))
            .await
            .with_context(|| format!("Failed to list {} of {}", category, owner_id))
    }
}

fn load_baselines(slots: &mut CategorySlots, files: Vec<AttachmentResource>) {
    for file in files {
        slots.load_baseline(
            file.slot_id,
            BaselineAttachment {
                server_id: file.id,
                path: file.path,
                last_modified: file.last_modified,
            },
        );
    }
}

fn details_from_resource(resource: &RequestResource) -> RequestDetails {
    RequestDetails {
        title: resource.title.clone(),
        description: resource.description.clone().unwrap_or_default(),
        event_type_id: resource.event_type_id,
        start_date: resource.start_date,
        end_date: resource.end_date,
        location: resource.location.clone().unwrap_or_default(),
        target_group_ids: resource.target_group_ids.clone(),
        expected_attendees: resource.expected_attendees,
        contact_phone: resource.contact_phone.clone().unwrap_or_default(),
        notes: resource.notes.clone().unwrap_or_default(),
    }
}

fn partner_fields(resource: &PartnerResource) -> PartnerFields {
    PartnerFields {
        name: resource.name.clone(),
        partner_type: resource.partner_type.and_then(PartnerType::from_code),
        license_number: resource.license_number.clone().unwrap_or_default(),
        license_expiry: resource.license_expiry,
        contact_phone: resource.contact_phone.clone().unwrap_or_default(),
        email: resource.email.clone().unwrap_or_default(),
    }
}

fn advertisement_fields(resource: &AdvertisementResource) -> AdvertisementFields {
    AdvertisementFields {
        title: resource.title.clone(),
        ad_type_id: resource.ad_type_id,
        channel_ids: resource.channel_ids.clone(),
        content: resource.content.clone().unwrap_or_default(),
        location: resource.location.clone().unwrap_or_default(),
        start_date: resource.start_date,
        end_date: resource.end_date,
    }
}
