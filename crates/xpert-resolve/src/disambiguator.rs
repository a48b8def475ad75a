//! Picks the one candidate (if any) that is the same person as a new expert.

use tracing::{debug, warn};
use uuid::Uuid;

use xpert_core::{Expert, MetaExpert};
use xpert_inference::prompts::disambiguation_prompt;
use xpert_inference::{find_success, DisambiguationResult, LlmGateway, LlmRequest};

/// Request id used for the disambiguation prompt.
const REQUEST_ID: &str = "disambiguate";

#[derive(Clone)]
pub struct Disambiguator {
    gateway: LlmGateway,
    model: String,
}

impl Disambiguator {
    pub fn new(gateway: LlmGateway, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
        }
    }

    /// Ask the model to choose among near-duplicate candidates.
    ///
    /// Returns `None` when the model declines, fails, or names an id that
    /// is not one of `candidates`.
    pub async fn pick(&self, candidates: &[MetaExpert], new_expert: &Expert) -> Option<MetaExpert> {
        if candidates.is_empty() {
            return None;
        }

        let request = LlmRequest::new(
            REQUEST_ID,
            disambiguation_prompt(candidates, new_expert),
            &self.model,
        );
        let responses = vec![self.gateway.run_one(request).await];

        let Some(data) = find_success(&responses, REQUEST_ID) else {
            warn!(expert_id = %new_expert.id, "Disambiguation request failed");
            return None;
        };

        let chosen = match DisambiguationResult::from_json(data) {
            Ok(DisambiguationResult { id: Some(id) }) => id,
            Ok(DisambiguationResult { id: None }) => {
                debug!(expert_id = %new_expert.id, "Model declined to pick a candidate");
                return None;
            }
            Err(e) => {
                warn!(expert_id = %new_expert.id, error = %e, "Unusable disambiguation reply");
                return None;
            }
        };

        let picked = Uuid::parse_str(&chosen)
            .ok()
            .and_then(|id| candidates.iter().find(|c| c.id == id));

        match picked {
            Some(meta) => {
                debug!(
                    expert_id = %new_expert.id,
                    meta_expert_id = %meta.id,
                    candidates = candidates.len(),
                    "Candidate picked by model"
                );
                Some(meta.clone())
            }
            None => {
                warn!(
                    expert_id = %new_expert.id,
                    returned_id = %chosen,
                    "Model picked an id outside the candidate set"
                );
                None
            }
        }
    }
}
