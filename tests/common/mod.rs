//! In-memory portal backend shared by the integration tests
//!
//! Every call is journaled as a start and an end event, with a short sleep
//! in between so concurrently issued calls interleave. Failures can be
//! injected per method and key.

#![allow(dead_code)]

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use permit_wizard::api::{
    AdvertisementPayload, AdvertisementService, AttachmentPayload, AttachmentResource, AttachmentService,
    CreatedRequest, PartnerPayload, PartnerService, RequestPayload, RequestResource, RequestService,
};
use permit_wizard::draft::{RequestDetails, ServerId, SlotDefinition};
use permit_wizard::wizard::BusinessRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub edge: Edge,
    pub method: &'static str,
    pub key: String,
}

#[derive(Default)]
struct State {
    journal: Vec<Event>,
    failures: Vec<(&'static str, Option<String>)>,
    configs: HashMap<String, Vec<SlotDefinition>>,
    requests: HashMap<ServerId, RequestResource>,
    listed: HashMap<(ServerId, String), Vec<AttachmentResource>>,
    created_requests: Vec<RequestPayload>,
    updated_requests: Vec<(ServerId, RequestPayload)>,
    created_partners: Vec<PartnerPayload>,
    created_advertisements: Vec<AdvertisementPayload>,
    updated_advertisements: Vec<(ServerId, AdvertisementPayload)>,
    created_attachments: Vec<AttachmentPayload>,
    updated_attachments: Vec<(ServerId, AttachmentPayload)>,
}

pub struct FakePortal {
    state: Mutex<State>,
    next_id: AtomicI64,
    latency: Duration,
}

impl Default for FakePortal {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePortal {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            next_id: AtomicI64::new(1000),
            latency: Duration::from_millis(5),
        }
    }

    pub fn with_configs(self, category_code: &str, definitions: Vec<SlotDefinition>) -> Self {
        self.state
            .lock()
            .unwrap()
            .configs
            .insert(category_code.to_string(), definitions);
        self
    }

    pub fn with_request(self, resource: RequestResource) -> Self {
        self.state.lock().unwrap().requests.insert(resource.id, resource);
        self
    }

    /// Attachments returned by `list_attachments` for an owner
    pub fn with_listed(self, owner_id: ServerId, category_code: &str, files: Vec<AttachmentResource>) -> Self {
        self.state
            .lock()
            .unwrap()
            .listed
            .insert((owner_id, category_code.to_string()), files);
        self
    }

    /// Fail every call of `method`, or only the one whose key matches
    pub fn fail(&self, method: &'static str, key: Option<&str>) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((method, key.map(str::to_string)));
    }

    pub fn journal(&self) -> Vec<Event> {
        self.state.lock().unwrap().journal.clone()
    }

    /// Started calls as "method key", in issue order
    pub fn calls(&self) -> Vec<String> {
        self.journal()
            .into_iter()
            .filter(|e| e.edge == Edge::Start)
            .map(|e| format!("{} {}", e.method, e.key))
            .collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.journal()
            .iter()
            .filter(|e| e.edge == Edge::Start && e.method == method)
            .count()
    }

    /// Calls to the save endpoints, excluding configuration and loading reads
    pub fn write_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("configs_by_category") && !c.starts_with("get_request") && !c.starts_with("list_attachments"))
            .collect()
    }

    pub fn created_requests(&self) -> Vec<RequestPayload> {
        self.state.lock().unwrap().created_requests.clone()
    }

    pub fn updated_requests(&self) -> Vec<(ServerId, RequestPayload)> {
        self.state.lock().unwrap().updated_requests.clone()
    }

    pub fn created_partners(&self) -> Vec<PartnerPayload> {
        self.state.lock().unwrap().created_partners.clone()
    }

    pub fn created_advertisements(&self) -> Vec<AdvertisementPayload> {
        self.state.lock().unwrap().created_advertisements.clone()
    }

    pub fn updated_advertisements(&self) -> Vec<(ServerId, AdvertisementPayload)> {
        self.state.lock().unwrap().updated_advertisements.clone()
    }

    pub fn created_attachments(&self) -> Vec<AttachmentPayload> {
        self.state.lock().unwrap().created_attachments.clone()
    }

    pub fn updated_attachments(&self) -> Vec<(ServerId, AttachmentPayload)> {
        self.state.lock().unwrap().updated_attachments.clone()
    }

    fn next_id(&self) -> ServerId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    async fn call<T>(&self, method: &'static str, key: String, apply: impl FnOnce(&mut State) -> T) -> Result<T> {
        self.record(Edge::Start, method, &key);
        tokio::time::sleep(self.latency).await;

        let mut state = self.state.lock().unwrap();
        state.journal.push(Event {
            edge: Edge::End,
            method,
            key: key.clone(),
        });
        let failed = state
            .failures
            .iter()
            .any(|(m, k)| *m == method && k.as_ref().is_none_or(|k| *k == key));
        if failed {
            bail!("{} {} rejected by the portal", method, key);
        }
        Ok(apply(&mut state))
    }

    fn record(&self, edge: Edge, method: &'static str, key: &str) {
        self.state.lock().unwrap().journal.push(Event {
            edge,
            method,
            key: key.to_string(),
        });
    }
}

#[async_trait]
impl AttachmentService for FakePortal {
    async fn configs_by_category(&self, category_code: &str) -> Result<Vec<SlotDefinition>> {
        self.call("configs_by_category", category_code.to_string(), |s| {
            s.configs.get(category_code).cloned().unwrap_or_default()
        })
        .await
    }

    async fn create_attachment(&self, payload: &AttachmentPayload) -> Result<ServerId> {
        let id = self.next_id();
        self.call("create_attachment", payload.file_name.clone(), |s| {
            s.created_attachments.push(payload.clone());
            id
        })
        .await
    }

    async fn update_attachment(&self, id: ServerId, payload: &AttachmentPayload) -> Result<()> {
        self.call("update_attachment", id.to_string(), |s| {
            s.updated_attachments.push((id, payload.clone()));
        })
        .await
    }

    async fn delete_attachment(&self, id: ServerId) -> Result<()> {
        self.call("delete_attachment", id.to_string(), |_| ()).await
    }

    async fn list_attachments(&self, owner_id: ServerId, category_code: &str) -> Result<Vec<AttachmentResource>> {
        self.call("list_attachments", format!("{}/{}", category_code, owner_id), |s| {
            s.listed
                .get(&(owner_id, category_code.to_string()))
                .cloned()
                .unwrap_or_default()
        })
        .await
    }
}

#[async_trait]
impl PartnerService for FakePortal {
    async fn create_partner(&self, payload: &PartnerPayload) -> Result<ServerId> {
        let id = self.next_id();
        self.call("create_partner", payload.name.clone(), |s| {
            s.created_partners.push(payload.clone());
            id
        })
        .await
    }

    async fn delete_partner(&self, id: ServerId) -> Result<()> {
        self.call("delete_partner", id.to_string(), |_| ()).await
    }
}

#[async_trait]
impl AdvertisementService for FakePortal {
    async fn create_advertisement(&self, payload: &AdvertisementPayload) -> Result<ServerId> {
        let id = self.next_id();
        self.call("create_advertisement", payload.title.clone(), |s| {
            s.created_advertisements.push(payload.clone());
            id
        })
        .await
    }

    async fn update_advertisement(&self, id: ServerId, payload: &AdvertisementPayload) -> Result<()> {
        self.call("update_advertisement", id.to_string(), |s| {
            s.updated_advertisements.push((id, payload.clone()));
        })
        .await
    }

    async fn delete_advertisement(&self, id: ServerId) -> Result<()> {
        self.call("delete_advertisement", id.to_string(), |_| ()).await
    }
}

#[async_trait]
impl RequestService for FakePortal {
    async fn create_request(&self, payload: &RequestPayload) -> Result<CreatedRequest> {
        let id = self.next_id();
        let partner_ids: Vec<ServerId> = payload.partners.iter().map(|_| self.next_id()).collect();
        self.call("create_request", payload.title.clone(), |s| {
            s.created_requests.push(payload.clone());
            CreatedRequest { id, partner_ids }
        })
        .await
    }

    async fn update_request(&self, id: ServerId, payload: &RequestPayload) -> Result<()> {
        self.call("update_request", id.to_string(), |s| {
            s.updated_requests.push((id, payload.clone()));
        })
        .await
    }

    async fn get_request(&self, id: ServerId) -> Result<RequestResource> {
        let found = self
            .call("get_request", id.to_string(), |s| s.requests.get(&id).cloned())
            .await?;
        match found {
            Some(resource) => Ok(resource),
            None => bail!("Request {} not found", id),
        }
    }
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
}

pub fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).unwrap()
}

pub fn rules() -> BusinessRules {
    BusinessRules::new(today())
}

/// Details that pass step 1 under `rules()`
pub fn valid_details() -> RequestDetails {
    RequestDetails {
        title: "Ramadan food drive".to_string(),
        event_type_id: Some(1),
        start_date: Some(date(3, 10)),
        end_date: Some(date(3, 20)),
        location: "Deira".to_string(),
        target_group_ids: vec![2],
        contact_phone: "0501234567".to_string(),
        ..Default::default()
    }
}

pub fn attachment(id: ServerId, slot_id: i64) -> AttachmentResource {
    AttachmentResource {
        id,
        slot_id,
        path: format!("/files/{}", id),
        last_modified: None,
    }
}
