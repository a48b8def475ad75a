//! Prompt builders for each prompt kind.
//!
//! Each builder pairs with a result type in [`crate::results`]; the JSON
//! shape requested here is exactly what that type's `from_json` accepts.

use serde_json::{json, Value as JsonValue};

use xpert_core::{Expert, Job, MetaExpert, SeniorityLevel};

/// Compact JSON view of a job for prompt context.
fn job_summary(job: &Job) -> JsonValue {
    json!({
        "role": job.role,
        "company": job.company,
        "description": job.description,
        "industry": job.industry,
        "location": job.location,
        "startDate": job.start_date,
        "endDate": job.end_date,
        "isEducation": job.is_education,
    })
}

fn jobs_summary(jobs: &[Job]) -> JsonValue {
    JsonValue::Array(jobs.iter().map(job_summary).collect())
}

/// Prompt asking for the seniority of one job.
pub fn seniority_prompt(job: &Job) -> String {
    let values: Vec<String> = SeniorityLevel::ALL
        .iter()
        .map(|level| format!("- {}", level))
        .collect();

    format!(
        r#"You are classifying the seniority of a single job.

JOB:
{job}

AVAILABLE VALUES:
{values}

Pick the one value that most closely matches the seniority of this job.

Return your response as a JSON object with this structure:
{{"seniority": "value"}}
"#,
        job = job_summary(job),
        values = values.join("\n"),
    )
}

/// Prompt asking for free-form expertise tags for a whole profile.
pub fn expert_tags_prompt(meta: &MetaExpert) -> String {
    let profile = json!({
        "name": meta.name,
        "profession": meta.profession,
        "company": meta.company,
        "description": meta.description,
        "geography": meta.geography,
        "jobs": jobs_summary(&meta.jobs),
    });

    format!(
        r#"You are an expert tag extractor. Using the expert profile below, generate short
tags (1-3 words each) covering the expert's:
  - Functional expertise
  - Technical skills
  - Language proficiency
  - Vendor usage
  - Tool usage

EXPERT PROFILE:
{profile:#}

Return your response as a JSON object with this structure:
{{"tags": ["tag one", "tag two"]}}
"#,
    )
}

/// Prompt asking the model to pick at most one candidate that is the same
/// person as the new expert.
pub fn disambiguation_prompt(candidates: &[MetaExpert], new_expert: &Expert) -> String {
    let candidates: Vec<JsonValue> = candidates
        .iter()
        .map(|c| {
            json!({
                "id": c.id,
                "name": c.name,
                "profession": c.profession,
                "company": c.company,
                "geography": c.geography,
                "linkedInLink": c.profile_link,
                "email": c.email,
                "jobs": jobs_summary(&c.jobs),
            })
        })
        .collect();

    let new_expert = json!({
        "name": new_expert.name,
        "profession": new_expert.profession,
        "company": new_expert.company,
        "geography": new_expert.geography,
        "linkedInLink": new_expert.profile_link,
        "email": new_expert.email,
        "jobs": jobs_summary(&new_expert.jobs),
    });

    format!(
        r#"You are a highly selective expert-matching system. Decide whether any of the
candidate meta experts is EXACTLY the same person as the new expert. It is far
better to return no match than to match the wrong person.

STRICT MATCHING CRITERIA:
1. Name must match exactly, allowing only trivial formatting differences.
2. Job history must overlap: at least one shared employer with compatible dates.
3. Location, profile link and email must not contradict each other.
4. Any major discrepancy disqualifies a candidate.

CANDIDATE META EXPERTS:
{candidates:#}

NEW EXPERT:
{new_expert:#}

Return ONLY this JSON object:
{{"relevant_expert_id": {{"id": "<candidate id or null>"}}}}

Return null if no candidate meets ALL criteria, if there is ANY doubt, or if
more than one candidate seems equally likely.
"#,
        candidates = JsonValue::Array(candidates),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_seniority_prompt_lists_vocabulary() {
        let mut job = Job::for_expert(Uuid::new_v4());
        job.role = Some("Staff Engineer".into());
        let prompt = seniority_prompt(&job);

        assert!(prompt.contains("Staff Engineer"));
        for level in SeniorityLevel::ALL {
            assert!(prompt.contains(level.as_str()));
        }
        assert!(prompt.contains(r#"{"seniority": "value"}"#));
    }

    #[test]
    fn test_tags_prompt_contains_profile() {
        let mut expert = Expert::new("Ada Lovelace");
        expert.profession = Some("Analyst".into());
        let meta = MetaExpert::from_expert(&expert);
        let prompt = expert_tags_prompt(&meta);

        assert!(prompt.contains("Ada Lovelace"));
        assert!(prompt.contains("Analyst"));
        assert!(prompt.contains(r#"{"tags":"#));
    }

    #[test]
    fn test_disambiguation_prompt_contains_candidate_ids() {
        let a = MetaExpert::from_expert(&Expert::new("Jon Smith"));
        let b = MetaExpert::from_expert(&Expert::new("Jon Smith"));
        let prompt = disambiguation_prompt(&[a.clone(), b.clone()], &Expert::new("Jon Smith"));

        assert!(prompt.contains(&a.id.to_string()));
        assert!(prompt.contains(&b.id.to_string()));
        assert!(prompt.contains("relevant_expert_id"));
    }
}
