//! Job seniority classification and expertise tagging.
//!
//! Both operations degrade rather than fail: a model error leaves the job
//! unclassified or the tag set empty, and resolution carries on.

use tracing::{debug, warn};
use uuid::Uuid;

use xpert_core::{Job, MetaExpert, SeniorityLevel, Tag};
use xpert_inference::prompts::{expert_tags_prompt, seniority_prompt};
use xpert_inference::{
    find_success, InferenceSettings, LlmGateway, LlmRequest, SeniorityResult, TagListResult,
};

/// Request id used for the tag prompt.
const TAGS_REQUEST_ID: &str = "expert_tags";

fn job_request_id(index: usize) -> String {
    format!("job_{}", index)
}

/// LLM-backed enrichment of meta-expert records.
#[derive(Clone)]
pub struct Enricher {
    gateway: LlmGateway,
    models: InferenceSettings,
}

impl Enricher {
    pub fn new(gateway: LlmGateway, models: InferenceSettings) -> Self {
        Self { gateway, models }
    }

    /// Classify every job's seniority in one batch and move all jobs to
    /// `owner_id`.
    ///
    /// Returns how many jobs received a seniority label. Jobs whose request
    /// failed keep `seniority_level` unset.
    pub async fn classify_jobs(&self, jobs: &mut [Job], owner_id: Uuid) -> usize {
        if jobs.is_empty() {
            return 0;
        }

        let requests = jobs
            .iter()
            .enumerate()
            .map(|(index, job)| {
                LlmRequest::new(
                    job_request_id(index),
                    seniority_prompt(job),
                    &self.models.job_details_model,
                )
            })
            .collect();

        let responses = self.gateway.run_batch(requests).await;

        let mut classified = 0;
        for (index, job) in jobs.iter_mut().enumerate() {
            let id = job_request_id(index);
            if let Some(data) = find_success(&responses, &id) {
                match SeniorityResult::from_json(data) {
                    Ok(result) => {
                        if SeniorityLevel::from_label(&result.seniority).is_none() {
                            warn!(
                                job_id = %job.id,
                                seniority = %result.seniority,
                                "Seniority outside known vocabulary, storing as returned"
                            );
                        }
                        job.seniority_level = Some(result.seniority);
                        classified += 1;
                    }
                    Err(e) => {
                        warn!(job_id = %job.id, error = %e, "Unusable seniority reply");
                    }
                }
            }
            job.assign_to_meta_expert(owner_id);
        }

        debug!(
            meta_expert_id = %owner_id,
            job_count = jobs.len(),
            classified,
            "Jobs classified"
        );
        classified
    }

    /// Generate a fresh tag set for a meta-expert; empty on any failure.
    pub async fn generate_tags(&self, meta: &MetaExpert) -> Vec<Tag> {
        let request = LlmRequest::new(
            TAGS_REQUEST_ID,
            expert_tags_prompt(meta),
            &self.models.expert_tags_model,
        );
        let responses = vec![self.gateway.run_one(request).await];

        let Some(data) = find_success(&responses, TAGS_REQUEST_ID) else {
            warn!(meta_expert_id = %meta.id, "Tag generation failed");
            return Vec::new();
        };

        match TagListResult::from_json(data) {
            Ok(result) => {
                let tags: Vec<Tag> = result
                    .tags
                    .into_iter()
                    .map(|label| Tag::new(label, meta.id))
                    .collect();
                debug!(meta_expert_id = %meta.id, tag_count = tags.len(), "Tags generated");
                tags
            }
            Err(e) => {
                warn!(meta_expert_id = %meta.id, error = %e, "Unusable tag reply");
                Vec::new()
            }
        }
    }
}
