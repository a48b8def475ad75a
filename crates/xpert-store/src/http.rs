//! REST client for the backend persistence API.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list meta-experts | `GET meta-experts/{owner}` → `{"metaExperts": [...]}` |
//! | create meta-expert | `POST meta-expert/{owner}` |
//! | update meta-expert | `PUT meta-expert/{owner}` |
//! | store tags | `POST meta-expert-tags/{metaExpertId}` (JSON array) |
//! | expert audit row | `POST expert/{owner}` |
//! | spend record | `POST spend` |
//!
//! Any non-2xx status is an [`Error::Storage`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use xpert_core::{
    Error, Expert, MetaExpert, MetaExpertStore, Result, SpendRecord, SpendRecorder, Tag,
};

use crate::config::StoreConfig;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetaExpertList {
    #[serde(default)]
    meta_experts: Option<Vec<MetaExpert>>,
}

/// HTTP implementation of [`MetaExpertStore`] and [`SpendRecorder`].
pub struct HttpStore {
    client: Client,
    base_url: Url,
    config: StoreConfig,
}

impl HttpStore {
    /// Create a client for the configured backend.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("Invalid backend URL '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Backend URL '{}' cannot be used as a base",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Storage(format!("Failed to create HTTP client: {}", e)))?;

        info!(base_url = %config.base_url, "Initializing backend store");
        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(StoreConfig::from_env())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Build `{base}/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Build a request with authentication if configured.
    fn build_request(&self, method: Method, segments: &[&str]) -> reqwest::RequestBuilder {
        let url = self.endpoint(segments);
        let mut req = self.client.request(method, url);

        if let Some(ref token) = self.config.token {
            req = req.bearer_auth(token);
        }

        req
    }

    /// Send a JSON body and require a 2xx status.
    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<()> {
        let path = segments.join("/");
        let response = self
            .build_request(method.clone(), segments)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("{} {} failed: {}", method, path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "{} {} returned {}: {}",
                method, path, status, text
            )));
        }

        debug!(%method, path = %path, status = status.as_u16(), "Backend write complete");
        Ok(())
    }
}

#[async_trait]
impl MetaExpertStore for HttpStore {
    async fn list_meta_experts(&self, owner: &str) -> Result<Vec<MetaExpert>> {
        let response = self
            .build_request(Method::GET, &["meta-experts", owner])
            .send()
            .await
            .map_err(|e| Error::Storage(format!("GET meta-experts failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "GET meta-experts returned {}: {}",
                status, text
            )));
        }

        let body: MetaExpertList = response
            .json()
            .await
            .map_err(|e| Error::Storage(format!("Invalid meta-expert list: {}", e)))?;
        let metas = body.meta_experts.unwrap_or_default();

        debug!(count = metas.len(), "Fetched meta-experts");
        Ok(metas)
    }

    async fn create_meta_expert(&self, owner: &str, meta: &MetaExpert) -> Result<()> {
        self.send_json(Method::POST, &["meta-expert", owner], meta)
            .await
    }

    async fn update_meta_expert(&self, owner: &str, meta: &MetaExpert) -> Result<()> {
        self.send_json(Method::PUT, &["meta-expert", owner], meta)
            .await
    }

    async fn create_tags(&self, meta_expert_id: Uuid, tags: &[Tag]) -> Result<()> {
        let id = meta_expert_id.to_string();
        self.send_json(Method::POST, &["meta-expert-tags", &id], tags)
            .await
    }

    async fn create_expert(&self, owner: &str, expert: &Expert) -> Result<()> {
        self.send_json(Method::POST, &["expert", owner], expert)
            .await
    }
}

#[async_trait]
impl SpendRecorder for HttpStore {
    async fn record_spend(&self, record: &SpendRecord) -> Result<()> {
        self.send_json(Method::POST, &["spend"], record).await
    }
}
