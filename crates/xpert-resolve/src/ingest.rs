//! End-to-end ingestion of provider profiles.
//!
//! convert → photo policy → resolve → audit row.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info};

use xpert_core::{Expert, MetaExpertStore, PhotoLookup, Result};

use crate::photo::PhotoPolicy;
use crate::profile::ProviderProfile;
use crate::resolver::{EntityResolver, Resolution};

/// Result of ingesting one profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    /// The audit row as stored, with its meta-expert back-reference set.
    pub expert: Expert,
    pub resolution: Resolution,
}

/// Runs provider profiles through resolution and stores the expert rows.
pub struct IngestPipeline {
    resolver: EntityResolver,
    store: Arc<dyn MetaExpertStore>,
    photos: Option<(PhotoPolicy, Arc<dyn PhotoLookup>)>,
    organization_id: Option<String>,
}

impl IngestPipeline {
    /// Audit rows go to the resolver's store.
    pub fn new(resolver: EntityResolver) -> Self {
        let store = resolver.store().clone();
        Self {
            resolver,
            store,
            photos: None,
            organization_id: None,
        }
    }

    /// Replace untrusted profile photos through `lookup`.
    pub fn with_photo_lookup(mut self, policy: PhotoPolicy, lookup: Arc<dyn PhotoLookup>) -> Self {
        self.photos = Some((policy, lookup));
        self
    }

    /// Scope every ingested expert to an organization.
    pub fn with_organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Ingest one profile for `owner`.
    pub async fn ingest(&self, owner: &str, profile: ProviderProfile) -> Result<IngestOutcome> {
        let mut expert = profile.into_expert(self.organization_id.clone())?;

        if let Some((policy, lookup)) = &self.photos {
            policy.apply(&mut expert, lookup.as_ref()).await;
        }

        let resolution = self.resolver.resolve(owner, &expert).await?;

        link_to_meta_expert(&mut expert, &resolution);
        self.store.create_expert(owner, &expert).await?;

        Ok(IngestOutcome { expert, resolution })
    }

    /// Ingest profiles one after another; one result per profile, in order.
    pub async fn ingest_batch(
        &self,
        owner: &str,
        profiles: Vec<ProviderProfile>,
    ) -> Vec<Result<IngestOutcome>> {
        let start = Instant::now();
        let total = profiles.len();
        let mut results = Vec::with_capacity(total);

        for (index, profile) in profiles.into_iter().enumerate() {
            let result = self.ingest(owner, profile).await;
            if let Err(e) = &result {
                error!(index, error = %e, "Profile ingestion failed");
            }
            results.push(result);
        }

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(
            total,
            failed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Ingestion batch complete"
        );
        results
    }
}

/// Point the audit row at its meta-expert.
///
/// Every job ends up owned by the meta-expert. Jobs the meta-expert adopted
/// are replaced by its enriched copy.
fn link_to_meta_expert(expert: &mut Expert, resolution: &Resolution) {
    let meta = &resolution.meta_expert;
    expert.meta_expert_id = Some(meta.id);
    for job in &mut expert.jobs {
        match meta.jobs.iter().find(|adopted| adopted.id == job.id) {
            Some(adopted) => *job = adopted.clone(),
            None => job.assign_to_meta_expert(meta.id),
        }
    }
}
