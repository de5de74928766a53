//! Per-step validators
//!
//! Every function here is pure: it reads the draft and reports the first
//! violated rule, in field order.

use log::debug;

use super::WizardStep;
use super::rules::{BusinessRules, RuleId, is_member};
use crate::draft::forms::is_blank;
use crate::draft::{AdvertisementFields, AttachmentCategory, ChildKind, PartnerFields, RequestDetails, WizardDraft};
use crate::error::ValidationError;

/// Result of checking one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: WizardStep,
    pub first_violation: Option<RuleId>,
}

impl StepOutcome {
    pub fn ok(&self) -> bool {
        self.first_violation.is_none()
    }
}

pub fn validate_details(details: &RequestDetails, rules: &BusinessRules) -> Result<(), RuleId> {
    if is_blank(&details.title) {
        return Err(RuleId::TitleRequired);
    }

    let event_type = details.event_type_id.ok_or(RuleId::EventTypeRequired)?;
    if !is_member(&rules.lookups.event_types, event_type) {
        return Err(RuleId::EventTypeUnknown);
    }

    let start = details.start_date.ok_or(RuleId::StartDateRequired)?;
    if start < rules.today {
        return Err(RuleId::StartDateInPast);
    }

    let end = details.end_date.ok_or(RuleId::EndDateRequired)?;
    if end < start {
        return Err(RuleId::EndBeforeStart);
    }

    if is_blank(&details.location) {
        return Err(RuleId::LocationRequired);
    }

    if details.target_group_ids.is_empty() {
        return Err(RuleId::TargetGroupRequired);
    }
    if !details
        .target_group_ids
        .iter()
        .all(|id| is_member(&rules.lookups.target_groups, *id))
    {
        return Err(RuleId::TargetGroupUnknown);
    }

    if is_blank(&details.contact_phone) {
        return Err(RuleId::ContactPhoneRequired);
    }
    if !rules.phone_is_valid(&details.contact_phone) {
        return Err(RuleId::ContactPhoneInvalid);
    }

    Ok(())
}

pub fn validate_partner(fields: &PartnerFields, rules: &BusinessRules) -> Result<(), RuleId> {
    if is_blank(&fields.name) {
        return Err(RuleId::PartnerNameRequired);
    }

    let partner_type = fields.partner_type.ok_or(RuleId::PartnerTypeRequired)?;
    if partner_type.requires_license() {
        if is_blank(&fields.license_number) {
            return Err(RuleId::PartnerLicenseNumberRequired);
        }
        let expiry = fields.license_expiry.ok_or(RuleId::PartnerLicenseExpiryRequired)?;
        if expiry < rules.today {
            return Err(RuleId::PartnerLicenseExpired);
        }
    }

    if !is_blank(&fields.contact_phone) && !rules.phone_is_valid(&fields.contact_phone) {
        return Err(RuleId::PartnerPhoneInvalid);
    }
    if !is_blank(&fields.email) && !rules.email_is_valid(&fields.email) {
        return Err(RuleId::PartnerEmailInvalid);
    }

    Ok(())
}

pub fn validate_advertisement(fields: &AdvertisementFields, rules: &BusinessRules) -> Result<(), RuleId> {
    if is_blank(&fields.title) {
        return Err(RuleId::AdvertisementTitleRequired);
    }

    let ad_type = fields.ad_type_id.ok_or(RuleId::AdvertisementTypeRequired)?;
    if !is_member(&rules.lookups.advertisement_types, ad_type) {
        return Err(RuleId::AdvertisementTypeUnknown);
    }

    if fields.channel_ids.is_empty() {
        return Err(RuleId::AdvertisementChannelRequired);
    }
    if !fields
        .channel_ids
        .iter()
        .all(|id| is_member(&rules.lookups.advertisement_channels, *id))
    {
        return Err(RuleId::AdvertisementChannelUnknown);
    }

    let start = fields.start_date.ok_or(RuleId::AdvertisementStartDateRequired)?;
    let end = fields.end_date.ok_or(RuleId::AdvertisementEndDateRequired)?;
    if end < start {
        return Err(RuleId::AdvertisementEndBeforeStart);
    }

    Ok(())
}

/// Full validation of an in-progress sub-form: its fields, then the
/// mandatory documents of its category
pub fn validate_sub_form(draft: &WizardDraft, kind: ChildKind, rules: &BusinessRules) -> Result<(), RuleId> {
    match kind {
        ChildKind::Partner => {
            validate_partner(&draft.partner_form, rules)?;
            if !draft.attachments.is_mandatory_satisfied(AttachmentCategory::Partner) {
                return Err(RuleId::PartnerAttachmentsMissing);
            }
        }
        ChildKind::Advertisement => {
            validate_advertisement(&draft.advertisement_form, rules)?;
            if !draft.attachments.is_mandatory_satisfied(AttachmentCategory::Advertisement) {
                return Err(RuleId::AdvertisementAttachmentsMissing);
            }
        }
    }
    Ok(())
}

/// A child step passes with an untouched sub-form; a partially filled one
/// reports its first violation
fn validate_child_step(draft: &WizardDraft, kind: ChildKind, rules: &BusinessRules) -> Result<(), RuleId> {
    if draft.sub_form_is_blank(kind) {
        return Ok(());
    }
    validate_sub_form(draft, kind, rules)
}

/// Mandatory documents of the request, then of every displayed child. A
/// kept child whose baseline was marked for deletion must get a replacement.
pub fn validate_attachments(draft: &WizardDraft) -> Result<(), RuleId> {
    if !draft.attachments.is_mandatory_satisfied(AttachmentCategory::Request) {
        return Err(RuleId::MandatoryAttachmentMissing);
    }
    if let Some(partner) = draft
        .partners
        .display()
        .iter()
        .find(|p| !p.attachments.is_mandatory_satisfied())
    {
        debug!("Partner {} is missing {:?}", partner.local_key(), partner.attachments.missing_mandatory());
        return Err(RuleId::PartnerAttachmentsMissing);
    }
    if let Some(ad) = draft
        .advertisements
        .display()
        .iter()
        .find(|a| !a.attachments.is_mandatory_satisfied())
    {
        debug!("Advertisement {} is missing {:?}", ad.local_key(), ad.attachments.missing_mandatory());
        return Err(RuleId::AdvertisementAttachmentsMissing);
    }
    Ok(())
}

pub fn validate_step(step: WizardStep, draft: &WizardDraft, rules: &BusinessRules) -> Result<(), RuleId> {
    match step {
        WizardStep::Details => validate_details(&draft.details, rules),
        WizardStep::Partners => validate_child_step(draft, ChildKind::Partner, rules),
        WizardStep::Advertisements => validate_child_step(draft, ChildKind::Advertisement, rules),
        WizardStep::Attachments => validate_attachments(draft),
        WizardStep::Review => draft
            .flow
            .steps()
            .iter()
            .filter(|s| **s != WizardStep::Review)
            .try_for_each(|s| validate_step(*s, draft, rules)),
    }
}

pub fn check_step(step: WizardStep, draft: &WizardDraft, rules: &BusinessRules) -> StepOutcome {
    StepOutcome {
        step,
        first_violation: validate_step(step, draft, rules).err(),
    }
}

/// Gate applied right before a draft is planned and submitted.
///
/// A non-blank sub-form is always an error here: either it is incomplete,
/// or it is complete but was never added to its collection. A final
/// submission needs every step valid; a draft save only needs the details.
pub fn validate_for_submission(draft: &WizardDraft, rules: &BusinessRules) -> Result<(), ValidationError> {
    for kind in [ChildKind::Partner, ChildKind::Advertisement] {
        if draft.sub_form_is_blank(kind) {
            continue;
        }
        let rule = match validate_sub_form(draft, kind, rules) {
            Err(rule) => rule,
            Ok(()) => match kind {
                ChildKind::Partner => RuleId::PartnerNotAdded,
                ChildKind::Advertisement => RuleId::AdvertisementNotAdded,
            },
        };
        return Err(ValidationError::ChildIncomplete { kind, rule });
    }

    if draft.is_draft_save {
        validate_details(&draft.details, rules)?;
        return Ok(());
    }

    for step in draft.flow.steps() {
        if let Err(rule) = validate_step(*step, draft, rules) {
            debug!("Submission blocked at step {:?}: {}", step, rule);
            return Err(ValidationError::Rule(rule));
        }
    }
    Ok(())
}
