//! Rule identifiers and the business-rule parameters validators consume

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

/// Identifies the first rule a step (or sub-form) violates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    // Request details
    TitleRequired,
    EventTypeRequired,
    EventTypeUnknown,
    StartDateRequired,
    StartDateInPast,
    EndDateRequired,
    EndBeforeStart,
    LocationRequired,
    TargetGroupRequired,
    TargetGroupUnknown,
    ContactPhoneRequired,
    ContactPhoneInvalid,

    // Partner sub-form
    PartnerNameRequired,
    PartnerTypeRequired,
    PartnerLicenseNumberRequired,
    PartnerLicenseExpiryRequired,
    PartnerLicenseExpired,
    PartnerPhoneInvalid,
    PartnerEmailInvalid,
    PartnerAttachmentsMissing,
    PartnerNotAdded,

    // Advertisement sub-form
    AdvertisementTitleRequired,
    AdvertisementTypeRequired,
    AdvertisementTypeUnknown,
    AdvertisementChannelRequired,
    AdvertisementChannelUnknown,
    AdvertisementStartDateRequired,
    AdvertisementEndDateRequired,
    AdvertisementEndBeforeStart,
    AdvertisementAttachmentsMissing,
    AdvertisementNotAdded,

    // Attachments
    MandatoryAttachmentMissing,
}

impl RuleId {
    /// Form field the rule is attached to
    pub fn field(&self) -> &'static str {
        match self {
            RuleId::TitleRequired => "title",
            RuleId::EventTypeRequired | RuleId::EventTypeUnknown => "eventTypeId",
            RuleId::StartDateRequired | RuleId::StartDateInPast => "startDate",
            RuleId::EndDateRequired | RuleId::EndBeforeStart => "endDate",
            RuleId::LocationRequired => "location",
            RuleId::TargetGroupRequired | RuleId::TargetGroupUnknown => "targetGroupIds",
            RuleId::ContactPhoneRequired | RuleId::ContactPhoneInvalid => "contactPhone",
            RuleId::PartnerNameRequired => "partner.name",
            RuleId::PartnerTypeRequired => "partner.partnerType",
            RuleId::PartnerLicenseNumberRequired => "partner.licenseNumber",
            RuleId::PartnerLicenseExpiryRequired | RuleId::PartnerLicenseExpired => "partner.licenseExpiry",
            RuleId::PartnerPhoneInvalid => "partner.contactPhone",
            RuleId::PartnerEmailInvalid => "partner.email",
            RuleId::PartnerAttachmentsMissing => "partner.attachments",
            RuleId::PartnerNotAdded => "partner",
            RuleId::AdvertisementTitleRequired => "advertisement.title",
            RuleId::AdvertisementTypeRequired | RuleId::AdvertisementTypeUnknown => "advertisement.adTypeId",
            RuleId::AdvertisementChannelRequired | RuleId::AdvertisementChannelUnknown => "advertisement.channelIds",
            RuleId::AdvertisementStartDateRequired => "advertisement.startDate",
            RuleId::AdvertisementEndDateRequired | RuleId::AdvertisementEndBeforeStart => "advertisement.endDate",
            RuleId::AdvertisementAttachmentsMissing => "advertisement.attachments",
            RuleId::AdvertisementNotAdded => "advertisement",
            RuleId::MandatoryAttachmentMissing => "attachments",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RuleId::TitleRequired => "Event name is required",
            RuleId::EventTypeRequired => "Event type is required",
            RuleId::EventTypeUnknown => "Event type is not a known option",
            RuleId::StartDateRequired => "Start date is required",
            RuleId::StartDateInPast => "Start date cannot be before today",
            RuleId::EndDateRequired => "End date is required",
            RuleId::EndBeforeStart => "End date must not be before the start date",
            RuleId::LocationRequired => "Location is required",
            RuleId::TargetGroupRequired => "Select at least one target group",
            RuleId::TargetGroupUnknown => "A selected target group is not a known option",
            RuleId::ContactPhoneRequired => "Contact phone is required",
            RuleId::ContactPhoneInvalid => "Contact phone is not valid",
            RuleId::PartnerNameRequired => "Partner name is required",
            RuleId::PartnerTypeRequired => "Partner type is required",
            RuleId::PartnerLicenseNumberRequired => "License number is required for suppliers and companies",
            RuleId::PartnerLicenseExpiryRequired => "License expiry date is required for suppliers and companies",
            RuleId::PartnerLicenseExpired => "Partner license has expired",
            RuleId::PartnerPhoneInvalid => "Partner phone is not valid",
            RuleId::PartnerEmailInvalid => "Partner email is not valid",
            RuleId::PartnerAttachmentsMissing => "Partner documents are missing",
            RuleId::PartnerNotAdded => "Partner details were entered but not added",
            RuleId::AdvertisementTitleRequired => "Advertisement title is required",
            RuleId::AdvertisementTypeRequired => "Advertisement type is required",
            RuleId::AdvertisementTypeUnknown => "Advertisement type is not a known option",
            RuleId::AdvertisementChannelRequired => "Select at least one advertisement channel",
            RuleId::AdvertisementChannelUnknown => "A selected advertisement channel is not a known option",
            RuleId::AdvertisementStartDateRequired => "Advertisement start date is required",
            RuleId::AdvertisementEndDateRequired => "Advertisement end date is required",
            RuleId::AdvertisementEndBeforeStart => "Advertisement end date must not be before its start date",
            RuleId::AdvertisementAttachmentsMissing => "Advertisement documents are missing",
            RuleId::AdvertisementNotAdded => "Advertisement details were entered but not added",
            RuleId::MandatoryAttachmentMissing => "A mandatory document is missing",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.field())
    }
}

/// Allowed ids for numeric enum fields. An empty set is not enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lookups {
    pub event_types: BTreeSet<i64>,
    pub target_groups: BTreeSet<i64>,
    pub advertisement_types: BTreeSet<i64>,
    pub advertisement_channels: BTreeSet<i64>,
}

pub(crate) fn is_member(allowed: &BTreeSet<i64>, id: i64) -> bool {
    allowed.is_empty() || allowed.contains(&id)
}

/// Parameters for the business rules the validators apply
#[derive(Debug, Clone)]
pub struct BusinessRules {
    pub today: NaiveDate,
    pub lookups: Lookups,
    pub phone_pattern: Option<Regex>,
}

impl BusinessRules {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            lookups: Lookups::default(),
            phone_pattern: None,
        }
    }

    pub fn with_lookups(mut self, lookups: Lookups) -> Self {
        self.lookups = lookups;
        self
    }

    pub fn with_phone_pattern(mut self, pattern: Regex) -> Self {
        self.phone_pattern = Some(pattern);
        self
    }

    /// Phones are accepted as-is unless a pattern is configured
    pub fn phone_is_valid(&self, phone: &str) -> bool {
        self.phone_pattern
            .as_ref()
            .is_none_or(|pattern| pattern.is_match(phone.trim()))
    }

    pub fn email_is_valid(&self, email: &str) -> bool {
        EMAIL_PATTERN.is_match(email.trim())
    }
}
