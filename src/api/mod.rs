//! Portal backend surface
//!
//! The engine talks to the backend only through the service traits below.
//! `PortalClient` implements all of them over HTTP; tests substitute
//! in-memory fakes.

pub mod client;
pub mod models;
pub mod retry;

pub use client::PortalClient;
pub use models::{
    AdvertisementPayload, AdvertisementResource, AttachmentPayload, AttachmentResource, ChildPayload, CreatedRecord,
    CreatedRequest, PartnerPayload, PartnerResource, RequestPayload, RequestResource,
};
pub use retry::{RetryConfig, RetryPolicy, RetryableError};

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::draft::{ServerId, SlotDefinition};

#[async_trait]
pub trait AttachmentService: Send + Sync {
    /// Slot definitions configured for a category code
    async fn configs_by_category(&self, category_code: &str) -> Result<Vec<SlotDefinition>>;

    async fn create_attachment(&self, payload: &AttachmentPayload) -> Result<ServerId>;

    async fn update_attachment(&self, id: ServerId, payload: &AttachmentPayload) -> Result<()>;

    async fn delete_attachment(&self, id: ServerId) -> Result<()>;

    async fn list_attachments(&self, owner_id: ServerId, category_code: &str) -> Result<Vec<AttachmentResource>>;
}

/// Partners can only be created or deleted
#[async_trait]
pub trait PartnerService: Send + Sync {
    async fn create_partner(&self, payload: &PartnerPayload) -> Result<ServerId>;

    async fn delete_partner(&self, id: ServerId) -> Result<()>;
}

#[async_trait]
pub trait AdvertisementService: Send + Sync {
    async fn create_advertisement(&self, payload: &AdvertisementPayload) -> Result<ServerId>;

    async fn update_advertisement(&self, id: ServerId, payload: &AdvertisementPayload) -> Result<()>;

    async fn delete_advertisement(&self, id: ServerId) -> Result<()>;
}

#[async_trait]
pub trait RequestService: Send + Sync {
    /// Combined create: the payload carries new partners and attachments
    async fn create_request(&self, payload: &RequestPayload) -> Result<CreatedRequest>;

    /// Nested children in the payload are ignored by the backend
    async fn update_request(&self, id: ServerId, payload: &RequestPayload) -> Result<()>;

    async fn get_request(&self, id: ServerId) -> Result<RequestResource>;
}

/// The collaborators one wizard session uses
#[derive(Clone)]
pub struct Services {
    pub attachments: Arc<dyn AttachmentService>,
    pub partners: Arc<dyn PartnerService>,
    pub advertisements: Arc<dyn AdvertisementService>,
    pub requests: Arc<dyn RequestService>,
}

impl Services {
    /// Route every service to a single backend
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: AttachmentService + PartnerService + AdvertisementService + RequestService + 'static,
    {
        Self {
            attachments: backend.clone(),
            partners: backend.clone(),
            advertisements: backend.clone(),
            requests: backend,
        }
    }
}
