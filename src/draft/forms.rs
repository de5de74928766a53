//! Form models backing the wizard steps

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Step 1 of every flow: the request itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestDetails {
    pub title: String,
    pub description: String,
    pub event_type_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: String,
    /// Minimum-one-of-many selection
    pub target_group_ids: Vec<i64>,
    pub expected_attendees: Option<u32>,
    pub contact_phone: String,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartnerType {
    Individual,
    Supplier,
    Company,
    Government,
}

impl PartnerType {
    pub fn code(&self) -> i32 {
        match self {
            PartnerType::Individual => 1,
            PartnerType::Supplier => 2,
            PartnerType::Company => 3,
            PartnerType::Government => 4,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(PartnerType::Individual),
            2 => Some(PartnerType::Supplier),
            3 => Some(PartnerType::Company),
            4 => Some(PartnerType::Government),
            _ => None,
        }
    }

    /// Suppliers and companies must present a trade license
    pub fn requires_license(&self) -> bool {
        matches!(self, PartnerType::Supplier | PartnerType::Company)
    }
}

impl fmt::Display for PartnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PartnerType::Individual => "individual",
            PartnerType::Supplier => "supplier",
            PartnerType::Company => "company",
            PartnerType::Government => "government entity",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnerFields {
    pub name: String,
    pub partner_type: Option<PartnerType>,
    pub license_number: String,
    pub license_expiry: Option<NaiveDate>,
    pub contact_phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvertisementFields {
    pub title: String,
    pub ad_type_id: Option<i64>,
    /// Minimum-one-of-many selection
    pub channel_ids: Vec<i64>,
    pub content: String,
    pub location: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Trimmed text, or `None` when blank
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl PartnerFields {
    pub fn is_blank(&self) -> bool {
        is_blank(&self.name)
            && self.partner_type.is_none()
            && is_blank(&self.license_number)
            && self.license_expiry.is_none()
            && is_blank(&self.contact_phone)
            && is_blank(&self.email)
    }
}

impl AdvertisementFields {
    pub fn is_blank(&self) -> bool {
        is_blank(&self.title)
            && self.ad_type_id.is_none()
            && self.channel_ids.is_empty()
            && is_blank(&self.content)
            && is_blank(&self.location)
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}
