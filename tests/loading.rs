mod common;

use anyhow::Result;
use std::sync::Arc;

use common::{FakePortal, attachment, date};
use permit_wizard::api::{AdvertisementResource, PartnerResource, RequestResource, Services};
use permit_wizard::draft::{
    AttachmentCategory, DraftLoader, ParentMode, PartnerType, RequestFlow, SlotDefinition, UploadPolicy,
};
use permit_wizard::wizard::{RuleId, validate_attachments};

fn portal() -> FakePortal {
    FakePortal::new()
        .with_configs("CharityEventPermit", vec![SlotDefinition::new(10, "Site plan", true)])
        .with_configs("FastingTent", vec![SlotDefinition::new(11, "Tent layout", true)])
        .with_configs("Partner", vec![SlotDefinition::new(20, "Trade license", false)])
        .with_configs("Advertisement", vec![SlotDefinition::new(30, "Artwork", false)])
        .with_request(RequestResource {
            id: 90,
            title: "Ramadan food drive".to_string(),
            description: None,
            event_type_id: Some(1),
            start_date: Some(date(3, 10)),
            end_date: Some(date(3, 20)),
            location: Some("Deira".to_string()),
            target_group_ids: vec![2],
            expected_attendees: Some(300),
            contact_phone: Some("0501234567".to_string()),
            notes: None,
            partners: vec![PartnerResource {
                id: 12,
                name: "Gulf Catering".to_string(),
                partner_type: Some(1),
                license_number: None,
                license_expiry: None,
                contact_phone: None,
                email: None,
                attachments: None,
            }],
            advertisements: vec![AdvertisementResource {
                id: 7,
                title: "Billboard".to_string(),
                ad_type_id: Some(1),
                channel_ids: vec![3],
                content: None,
                location: None,
                start_date: Some(date(3, 10)),
                end_date: Some(date(3, 12)),
                attachments: Some(vec![attachment(700, 30)]),
            }],
            attachments: Some(vec![attachment(500, 10)]),
        })
        .with_listed(12, "Partner", vec![attachment(520, 20)])
}

fn loader(portal: Arc<FakePortal>) -> DraftLoader {
    DraftLoader::new(Services::from_backend(portal), UploadPolicy::default())
}

#[tokio::test]
async fn test_new_draft_configures_every_category() -> Result<()> {
    let portal = Arc::new(portal());
    let draft = loader(portal.clone()).new_draft(RequestFlow::CharityEventPermit).await?;

    assert_eq!(draft.mode(), ParentMode::Create);
    assert_eq!(portal.count("configs_by_category"), 3);
    assert_eq!(
        draft
            .attachments
            .slots(AttachmentCategory::Partner)
            .map(|s| s.definitions().len()),
        Some(1)
    );
    assert_eq!(validate_attachments(&draft), Err(RuleId::MandatoryAttachmentMissing));
    Ok(())
}

#[tokio::test]
async fn test_load_for_edit_hydrates_baseline() -> Result<()> {
    let portal = Arc::new(portal());
    let draft = loader(portal.clone())
        .load_for_edit(RequestFlow::CharityEventPermit, 90)
        .await?;

    assert_eq!(draft.mode(), ParentMode::Update(90));
    assert_eq!(draft.details.title, "Ramadan food drive");
    assert_eq!(draft.details.location, "Deira");
    assert_eq!(draft.details.expected_attendees, Some(300));
    assert!(draft.details.notes.is_empty());

    let request_slot = draft
        .attachments
        .slots(AttachmentCategory::Request)
        .and_then(|s| s.slot(10))
        .and_then(|s| s.baseline())
        .map(|b| b.server_id);
    assert_eq!(request_slot, Some(500));
    assert!(validate_attachments(&draft).is_ok());

    let partner = draft.partners.find_by_server_id(12).expect("partner 12 loaded");
    assert_eq!(partner.fields.partner_type, Some(PartnerType::Individual));
    assert_eq!(partner.attachments.slot(20).and_then(|s| s.baseline()).map(|b| b.server_id), Some(520));

    let ad = draft.advertisements.find_by_server_id(7).expect("advertisement 7 loaded");
    assert_eq!(ad.attachments.slot(30).and_then(|s| s.baseline()).map(|b| b.server_id), Some(700));

    // Only the partner omitted its attachment list
    assert_eq!(portal.calls().iter().filter(|c| c.starts_with("list_attachments")).count(), 1);
    assert!(portal.write_calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_flow_without_advertisements_skips_them() -> Result<()> {
    let portal = Arc::new(portal());
    let draft = loader(portal.clone()).load_for_edit(RequestFlow::FastingTent, 90).await?;

    assert!(draft.advertisements.is_empty());
    assert_eq!(draft.partners.len(), 1);
    assert!(!portal.calls().contains(&"configs_by_category Advertisement".to_string()));

    // The loaded file sits in slot 10, which the fasting tent flow does not define
    assert_eq!(validate_attachments(&draft), Err(RuleId::MandatoryAttachmentMissing));
    Ok(())
}

#[tokio::test]
async fn test_missing_request_fails_loading() {
    let portal = Arc::new(portal());
    let err = loader(portal)
        .load_for_edit(RequestFlow::CharityEventPermit, 404)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to load request 404"));
}

#[tokio::test]
async fn test_configuration_failure_fails_loading() {
    let portal = Arc::new(portal());
    portal.fail("configs_by_category", Some("Partner"));
    let err = loader(portal).new_draft(RequestFlow::EventPermit).await.unwrap_err();
    assert!(err.to_string().contains("slot configuration"));
}
