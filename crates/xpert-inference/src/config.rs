//! Model selection and gateway configuration.

use xpert_core::defaults;

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Which model serves each prompt kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceSettings {
    /// Model used to pick between several fuzzy-match candidates.
    pub find_meta_expert_model: String,
    /// Model used for per-job seniority classification.
    pub job_details_model: String,
    /// Model used for expertise tag generation.
    pub expert_tags_model: String,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            find_meta_expert_model: defaults::GEN_MODEL.to_string(),
            job_details_model: defaults::GEN_MODEL.to_string(),
            expert_tags_model: defaults::GEN_MODEL.to_string(),
        }
    }
}

impl InferenceSettings {
    /// Load from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `FIND_META_EXPERT_MODEL` | `gpt-4o-mini` |
    /// | `JOB_DETAILS_MODEL` | `gpt-4o-mini` |
    /// | `EXPERT_TAGS_MODEL` | value of `JOB_DETAILS_MODEL` |
    pub fn from_env() -> Self {
        let job_details_model =
            env_string("JOB_DETAILS_MODEL").unwrap_or_else(|| defaults::GEN_MODEL.to_string());
        Self {
            find_meta_expert_model: env_string("FIND_META_EXPERT_MODEL")
                .unwrap_or_else(|| defaults::GEN_MODEL.to_string()),
            expert_tags_model: env_string("EXPERT_TAGS_MODEL")
                .unwrap_or_else(|| job_details_model.clone()),
            job_details_model,
        }
    }

    /// Use one model for every prompt kind.
    pub fn uniform(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            find_meta_expert_model: model.clone(),
            job_details_model: model.clone(),
            expert_tags_model: model,
        }
    }
}

/// Gateway concurrency and cost accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Pool size shared by every batch.
    pub max_workers: usize,
    /// Batch width multiplier.
    pub workers_per_request: usize,
    /// Currency units charged per 1000 tokens.
    pub cost_per_1k_tokens: f64,
    /// Copied onto every spend record.
    pub source_email_id: Option<String>,
    /// Copied onto every spend record.
    pub test_id: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_workers: defaults::LLM_MAX_WORKERS,
            workers_per_request: defaults::LLM_WORKERS_PER_REQUEST,
            cost_per_1k_tokens: defaults::LLM_COST_PER_1K_TOKENS,
            source_email_id: None,
            test_id: None,
        }
    }
}

impl GatewayConfig {
    /// Load from environment variables.
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `LLM_MAX_WORKERS` | `20` | Concurrent model calls |
    /// | `LLM_COST_PER_1K_TOKENS` | `0.0025` | Spend rate |
    /// | `SOURCING_ID` | (none) | Source tag on spend records |
    /// | `TEST_ID` | (none) | Test-run tag on spend records |
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            max_workers: env_string("LLM_MAX_WORKERS")
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(base.max_workers),
            cost_per_1k_tokens: env_string("LLM_COST_PER_1K_TOKENS")
                .and_then(|s| s.parse().ok())
                .filter(|c: &f64| c.is_finite() && *c >= 0.0)
                .unwrap_or(base.cost_per_1k_tokens),
            source_email_id: env_string("SOURCING_ID"),
            test_id: env_string("TEST_ID"),
            ..base
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_cost_per_1k_tokens(mut self, cost: f64) -> Self {
        self.cost_per_1k_tokens = cost;
        self
    }

    pub fn with_source_email_id(mut self, id: impl Into<String>) -> Self {
        self.source_email_id = Some(id.into());
        self
    }

    pub fn with_test_id(mut self, id: impl Into<String>) -> Self {
        self.test_id = Some(id.into());
        self
    }

    /// Spend for one call: `tokens × rate / 1000`.
    pub fn spend_for(&self, total_tokens: u32) -> f64 {
        f64::from(total_tokens) * self.cost_per_1k_tokens / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.max_workers, 20);
        assert_eq!(config.workers_per_request, 2);
        assert!(config.source_email_id.is_none());

        let models = InferenceSettings::default();
        assert_eq!(models.job_details_model, "gpt-4o-mini");
        assert_eq!(models.expert_tags_model, "gpt-4o-mini");
    }

    #[test]
    fn test_spend_for() {
        let config = GatewayConfig::default();
        assert!((config.spend_for(1000) - 0.0025).abs() < 1e-12);
        assert!((config.spend_for(400) - 0.001).abs() < 1e-12);
        assert_eq!(config.spend_for(0), 0.0);
    }

    #[test]
    fn test_builders() {
        let config = GatewayConfig::default()
            .with_max_workers(4)
            .with_cost_per_1k_tokens(0.01)
            .with_source_email_id("src-1")
            .with_test_id("t-9");
        assert_eq!(config.max_workers, 4);
        assert!((config.spend_for(1000) - 0.01).abs() < 1e-12);
        assert_eq!(config.source_email_id.as_deref(), Some("src-1"));
        assert_eq!(config.test_id.as_deref(), Some("t-9"));
    }

    #[test]
    fn test_uniform_models() {
        let models = InferenceSettings::uniform("local-model");
        assert_eq!(models.find_meta_expert_model, "local-model");
        assert_eq!(models.job_details_model, "local-model");
        assert_eq!(models.expert_tags_model, "local-model");
    }
}
