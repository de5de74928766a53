//! HTTP implementation of the portal services

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::models::{
    AdvertisementPayload, AttachmentPayload, AttachmentResource, CreatedRecord, CreatedRequest, PartnerPayload,
    RequestPayload, RequestResource,
};
use super::retry::{RetryConfig, RetryPolicy};
use super::{AdvertisementService, AttachmentService, PartnerService, RequestService};
use crate::draft::{ServerId, SlotDefinition};

/// Portal REST client with connection pooling and retries
#[derive(Clone)]
pub struct PortalClient {
    base_url: String,
    http_client: reqwest::Client,
    access_token: Option<String>,
    retry_policy: RetryPolicy,
}

impl PortalClient {
    pub fn new(
        base_url: impl Into<String>,
        access_token: Option<String>,
        timeout: Duration,
        retry_config: RetryConfig,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("permit-wizard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_custom_client(base_url, access_token, http_client, retry_config))
    }

    pub fn with_custom_client(
        base_url: impl Into<String>,
        access_token: Option<String>,
        http_client: reqwest::Client,
        retry_config: RetryConfig,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
            access_token,
            retry_policy: RetryPolicy::new(retry_config),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send<B>(&self, method: Method, url: &str, body: Option<&B>) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized + Sync,
    {
        debug!("{} {}", method, url);
        let attempt = || async {
            let mut request = self
                .http_client
                .request(method.clone(), url)
                .header("Accept", "application/json");
            if let Some(token) = &self.access_token {
                request = request.bearer_auth(token);
            }
            if let Some(body) = body {
                request = request.json(body);
            }
            request.send().await?.error_for_status()
        };
        let result = if method.is_idempotent() {
            self.retry_policy.execute(attempt).await
        } else {
            self.retry_policy.execute_non_idempotent(attempt).await
        };
        result.with_context(|| format!("{} {} failed", method, url))
    }

    async fn send_json<B, T>(&self, method: Method, url: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.send(method.clone(), url, body).await?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response of {} {}", method, url))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.send_json::<(), T>(Method::GET, url, None).await
    }

    async fn delete(&self, url: &str) -> Result<()> {
        self.send::<()>(Method::DELETE, url, None).await?;
        Ok(())
    }
}

#[async_trait]
impl AttachmentService for PortalClient {
    async fn configs_by_category(&self, category_code: &str) -> Result<Vec<SlotDefinition>> {
        let url = Url::parse_with_params(&self.endpoint("attachments/configs"), &[("category", category_code)])
            .context("Invalid portal base URL")?;
        self.get_json(url.as_str()).await
    }

    async fn create_attachment(&self, payload: &AttachmentPayload) -> Result<ServerId> {
        let created: CreatedRecord = self
            .send_json(Method::POST, &self.endpoint("attachments"), Some(payload))
            .await?;
        Ok(created.id)
    }

    async fn update_attachment(&self, id: ServerId, payload: &AttachmentPayload) -> Result<()> {
        self.send(Method::PUT, &self.endpoint(&format!("attachments/{}", id)), Some(payload))
            .await?;
        Ok(())
    }

    async fn delete_attachment(&self, id: ServerId) -> Result<()> {
        self.delete(&self.endpoint(&format!("attachments/{}", id))).await
    }

    async fn list_attachments(&self, owner_id: ServerId, category_code: &str) -> Result<Vec<AttachmentResource>> {
        let owner = owner_id.to_string();
        let url = Url::parse_with_params(
            &self.endpoint("attachments"),
            &[("ownerId", owner.as_str()), ("category", category_code)],
        )
        .context("Invalid portal base URL")?;
        self.get_json(url.as_str()).await
    }
}

#[async_trait]
impl PartnerService for PortalClient {
    async fn create_partner(&self, payload: &PartnerPayload) -> Result<ServerId> {
        let created: CreatedRecord = self
            .send_json(Method::POST, &self.endpoint("partners"), Some(payload))
            .await?;
        Ok(created.id)
    }

    async fn delete_partner(&self, id: ServerId) -> Result<()> {
        self.delete(&self.endpoint(&format!("partners/{}", id))).await
    }
}

#[async_trait]
impl AdvertisementService for PortalClient {
    async fn create_advertisement(&self, payload: &AdvertisementPayload) -> Result<ServerId> {
        let created: CreatedRecord = self
            .send_json(Method::POST, &self.endpoint("advertisements"), Some(payload))
            .await?;
        Ok(created.id)
    }

    async fn update_advertisement(&self, id: ServerId, payload: &AdvertisementPayload) -> Result<()> {
        self.send(Method::PUT, &self.endpoint(&format!("advertisements/{}", id)), Some(payload))
            .await?;
        Ok(())
    }

    async fn delete_advertisement(&self, id: ServerId) -> Result<()> {
        self.delete(&self.endpoint(&format!("advertisements/{}", id))).await
    }
}

#[async_trait]
impl RequestService for PortalClient {
    async fn create_request(&self, payload: &RequestPayload) -> Result<CreatedRequest> {
        self.send_json(Method::POST, &self.endpoint("requests"), Some(payload))
            .await
    }

    async fn update_request(&self, id: ServerId, payload: &RequestPayload) -> Result<()> {
        self.send(Method::PUT, &self.endpoint(&format!("requests/{}", id)), Some(payload))
            .await?;
        Ok(())
    }

    async fn get_request(&self, id: ServerId) -> Result<RequestResource> {
        self.get_json(&self.endpoint(&format!("requests/{}", id))).await
    }
}
