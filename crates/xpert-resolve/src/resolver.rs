//! Entity resolution: attach a newly observed expert to an existing
//! meta-expert or create a new one.
//!
//! ```text
//! Start → ScopeFiltered → ExactMatchCheck → FuzzyMatchCheck
//!       → Merge | Create → Enriched → Persisted
//! ```
//!
//! Store failures abort resolution of the expert. Model failures only
//! degrade the result: no match becomes a create, a failed seniority call
//! leaves the job unclassified, a failed tag call yields no tags.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use xpert_core::{defaults, Expert, MetaExpert, MetaExpertStore, Result, Tag};
use xpert_inference::{InferenceSettings, LlmGateway};

use crate::disambiguator::Disambiguator;
use crate::enricher::Enricher;
use crate::similarity::name_distance;

/// Resolver tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Names match when their normalized edit distance is strictly below this.
    pub name_match_threshold: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            name_match_threshold: defaults::NAME_MATCH_THRESHOLD,
        }
    }
}

impl ResolverConfig {
    /// | Variable | Default |
    /// |----------|---------|
    /// | `NAME_MATCH_THRESHOLD` | `0.05` |
    pub fn from_env() -> Self {
        Self {
            name_match_threshold: std::env::var("NAME_MATCH_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|t: &f64| (0.0..=1.0).contains(t))
                .unwrap_or(defaults::NAME_MATCH_THRESHOLD),
        }
    }

    pub fn with_name_match_threshold(mut self, threshold: f64) -> Self {
        self.name_match_threshold = threshold;
        self
    }
}

/// Resolution state, as traced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStage {
    Start,
    ScopeFiltered,
    ExactMatchCheck,
    FuzzyMatchCheck,
    Merge,
    Create,
    Enriched,
    Persisted,
}

impl ResolutionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStage::Start => "start",
            ResolutionStage::ScopeFiltered => "scope_filtered",
            ResolutionStage::ExactMatchCheck => "exact_match_check",
            ResolutionStage::FuzzyMatchCheck => "fuzzy_match_check",
            ResolutionStage::Merge => "merge",
            ResolutionStage::Create => "create",
            ResolutionStage::Enriched => "enriched",
            ResolutionStage::Persisted => "persisted",
        }
    }
}

impl fmt::Display for ResolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an existing meta-expert was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    ProfileLink,
    Email,
    Name,
    Disambiguation,
}

/// Outcome of resolving one expert.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// The meta-expert the expert now belongs to, as persisted.
    pub meta_expert: MetaExpert,
    /// Tags generated this run (possibly empty).
    pub tags: Vec<Tag>,
    /// Whether `meta_expert` was created by this resolution.
    pub was_new: bool,
    /// `None` when `was_new`.
    pub matched_by: Option<MatchMethod>,
}

/// Resolves experts against the meta-experts visible to an owner.
#[derive(Clone)]
pub struct EntityResolver {
    store: Arc<dyn MetaExpertStore>,
    disambiguator: Disambiguator,
    enricher: Enricher,
    config: ResolverConfig,
}

impl EntityResolver {
    pub fn new(
        store: Arc<dyn MetaExpertStore>,
        disambiguator: Disambiguator,
        enricher: Enricher,
        config: ResolverConfig,
    ) -> Self {
        Self {
            store,
            disambiguator,
            enricher,
            config,
        }
    }

    /// Build the disambiguator and enricher over one shared gateway.
    pub fn with_gateway(
        store: Arc<dyn MetaExpertStore>,
        gateway: LlmGateway,
        models: InferenceSettings,
        config: ResolverConfig,
    ) -> Self {
        let disambiguator = Disambiguator::new(gateway.clone(), &models.find_meta_expert_model);
        let enricher = Enricher::new(gateway, models);
        Self::new(store, disambiguator, enricher, config)
    }

    pub fn store(&self) -> &Arc<dyn MetaExpertStore> {
        &self.store
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve one expert for `owner`, persisting the merged or created
    /// meta-expert and its tags.
    #[instrument(skip(self, expert), fields(expert_id = %expert.id))]
    pub async fn resolve(&self, owner: &str, expert: &Expert) -> Result<Resolution> {
        trace_stage(ResolutionStage::Start);

        let all = self.store.list_meta_experts(owner).await?;
        let candidates: Vec<MetaExpert> = all
            .into_iter()
            .filter(|m| m.organization_id == expert.organization_id)
            .collect();
        debug!(
            stage = %ResolutionStage::ScopeFiltered,
            candidates = candidates.len(),
            "Candidates in scope"
        );

        let matched = self.find_match(&candidates, expert).await;

        let (meta, matched_by) = match matched {
            Some((mut meta, method)) => {
                trace_stage(ResolutionStage::Merge);
                self.merge(owner, &mut meta, expert).await?;
                (meta, Some(method))
            }
            None => {
                trace_stage(ResolutionStage::Create);
                (self.create(owner, expert).await?, None)
            }
        };
        let was_new = matched_by.is_none();

        let tags = self.enricher.generate_tags(&meta).await;
        trace_stage(ResolutionStage::Enriched);

        if !tags.is_empty() {
            self.store.create_tags(meta.id, &tags).await?;
        }
        trace_stage(ResolutionStage::Persisted);

        info!(
            meta_expert_id = %meta.id,
            was_new,
            matched_by = ?matched_by,
            tag_count = tags.len(),
            "Expert resolved"
        );

        Ok(Resolution {
            meta_expert: meta,
            tags,
            was_new,
            matched_by,
        })
    }

    /// Exact link, exact email, then fuzzy name (with disambiguation).
    async fn find_match(
        &self,
        candidates: &[MetaExpert],
        expert: &Expert,
    ) -> Option<(MetaExpert, MatchMethod)> {
        trace_stage(ResolutionStage::ExactMatchCheck);

        if let Some(link) = expert.profile_link() {
            if let Some(meta) = candidates.iter().find(|m| m.profile_link() == Some(link)) {
                debug!(meta_expert_id = %meta.id, "Matched by profile link");
                return Some((meta.clone(), MatchMethod::ProfileLink));
            }
        }

        if let Some(email) = expert.email() {
            if let Some(meta) = candidates.iter().find(|m| m.email() == Some(email)) {
                debug!(meta_expert_id = %meta.id, "Matched by email");
                return Some((meta.clone(), MatchMethod::Email));
            }
        }

        trace_stage(ResolutionStage::FuzzyMatchCheck);

        if expert.name.trim().is_empty() {
            debug!("Expert has no name, skipping name match");
            return None;
        }

        let threshold = self.config.name_match_threshold;
        let close: Vec<MetaExpert> = candidates
            .iter()
            .filter(|m| !m.name.trim().is_empty())
            .filter(|m| name_distance(&expert.name, &m.name) < threshold)
            .cloned()
            .collect();

        match close.len() {
            0 => {
                debug!("No candidate with a similar name");
                None
            }
            1 => {
                let meta = close.into_iter().next()?;
                debug!(meta_expert_id = %meta.id, "Matched by name");
                Some((meta, MatchMethod::Name))
            }
            n => {
                debug!(candidates = n, "Several similar names, disambiguating");
                self.disambiguator
                    .pick(&close, expert)
                    .await
                    .map(|meta| (meta, MatchMethod::Disambiguation))
            }
        }
    }

    /// Backfill a missing profile link, taking the expert's jobs with it.
    async fn merge(&self, owner: &str, meta: &mut MetaExpert, expert: &Expert) -> Result<()> {
        let Some(link) = expert.profile_link() else {
            return Ok(());
        };
        if meta.profile_link().is_some() {
            return Ok(());
        }

        debug!(meta_expert_id = %meta.id, "Backfilling profile link and jobs");
        meta.profile_link = Some(link.to_string());
        // The expert's job list replaces the stored one wholesale.
        meta.jobs = expert.jobs.clone();
        self.enricher.classify_jobs(&mut meta.jobs, meta.id).await;

        self.store.update_meta_expert(owner, meta).await
    }

    async fn create(&self, owner: &str, expert: &Expert) -> Result<MetaExpert> {
        let mut meta = MetaExpert::from_expert(expert);
        self.enricher.classify_jobs(&mut meta.jobs, meta.id).await;
        self.store.create_meta_expert(owner, &meta).await?;
        debug!(meta_expert_id = %meta.id, jobs = meta.jobs.len(), "Created meta-expert");
        Ok(meta)
    }
}

fn trace_stage(stage: ResolutionStage) {
    debug!(stage = %stage, "Resolution stage");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_threshold() {
        assert_eq!(ResolverConfig::default().name_match_threshold, 0.05);
        assert_eq!(
            ResolverConfig::default()
                .with_name_match_threshold(0.2)
                .name_match_threshold,
            0.2
        );
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(ResolutionStage::ScopeFiltered.to_string(), "scope_filtered");
        assert_eq!(ResolutionStage::Persisted.as_str(), "persisted");
    }

    #[test]
    fn test_match_method_serializes_snake_case() {
        let value = serde_json::to_value(MatchMethod::ProfileLink).unwrap();
        assert_eq!(value, serde_json::json!("profile_link"));
    }
}
