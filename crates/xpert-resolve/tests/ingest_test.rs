//! Provider-profile ingestion over the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use xpert_core::{Error, JobOwner, PhotoLookup, Result};
use xpert_inference::mock::MockCompletionBackend;
use xpert_inference::{GatewayConfig, InferenceSettings, LlmGateway};
use xpert_resolve::{
    EntityResolver, IngestPipeline, MatchMethod, PhotoPolicy, ProviderProfile, ResolverConfig,
};
use xpert_store::MemoryStore;

const OWNER: &str = "sourcer@example.com";

fn pipeline(store: &MemoryStore) -> IngestPipeline {
    let backend = MockCompletionBackend::new()
        .with_response_mapping("expert tag extractor", r#"{"tags": ["Logistics"]}"#)
        .with_response_mapping("classifying the seniority", r#"{"seniority": "Director"}"#);
    let gateway = LlmGateway::new(Arc::new(backend), GatewayConfig::default());
    let resolver = EntityResolver::with_gateway(
        Arc::new(store.clone()),
        gateway,
        InferenceSettings::default(),
        ResolverConfig::default(),
    );
    IngestPipeline::new(resolver).with_organization_id("org-1")
}

fn profile(url: &str, name: &str) -> ProviderProfile {
    serde_json::from_value(json!({
        "linkedin_profile_url": url,
        "full_name": name,
        "occupation": "Head of Logistics at Globex",
        "city": "Denver",
        "country": "US",
        "connections": 800,
        "profile_pic_url": "https://cdn.example/avatar.png",
        "experiences": [{
            "title": "Head of Logistics",
            "company": "Globex",
            "starts_at": {"year": 2020, "month": 6}
        }]
    }))
    .unwrap()
}

struct StaticLookup;

#[async_trait]
impl PhotoLookup for StaticLookup {
    async fn find_photo(
        &self,
        _name: &str,
        _company: Option<&str>,
        _profile_link: Option<&str>,
    ) -> Result<Option<String>> {
        Ok(Some("https://media.licdn.com/dms/image/found".into()))
    }
}

#[tokio::test]
async fn test_ingest_creates_and_stores_audit_row() {
    let store = MemoryStore::new();
    let outcome = pipeline(&store)
        .ingest(OWNER, profile("linkedin.com/in/hank", "Hank Scorpio"))
        .await
        .unwrap();

    assert!(outcome.resolution.was_new);
    let meta = &outcome.resolution.meta_expert;
    assert_eq!(meta.organization_id.as_deref(), Some("org-1"));
    assert_eq!(meta.profession, "Head of Logistics");
    assert_eq!(meta.company, "Globex");
    assert_eq!(meta.geography, "Denver, US");
    assert_eq!(meta.jobs[0].seniority_level.as_deref(), Some("Director"));

    let experts = store.experts().await;
    assert_eq!(experts.len(), 1);
    assert_eq!(experts[0].meta_expert_id, Some(meta.id));
    assert_eq!(
        experts[0].profile_link.as_deref(),
        Some("https://www.linkedin.com/in/hank")
    );
    assert_eq!(experts[0].connection_count, None);
}

#[tokio::test]
async fn test_second_sighting_merges_by_link() {
    let store = MemoryStore::new();
    let pipeline = pipeline(&store);

    let first = pipeline
        .ingest(OWNER, profile("https://www.linkedin.com/in/hank", "Hank Scorpio"))
        .await
        .unwrap();
    let second = pipeline
        .ingest(OWNER, profile("linkedin.com/in/hank", "H. Scorpio"))
        .await
        .unwrap();

    assert!(!second.resolution.was_new);
    assert_eq!(second.resolution.matched_by, Some(MatchMethod::ProfileLink));
    assert_eq!(
        second.resolution.meta_expert.id,
        first.resolution.meta_expert.id
    );
    assert_eq!(store.meta_experts(OWNER).await.len(), 1);
    assert_eq!(store.experts().await.len(), 2);
}

#[tokio::test]
async fn test_audit_row_jobs_belong_to_meta_expert() {
    let store = MemoryStore::new();
    let outcome = pipeline(&store)
        .ingest(OWNER, profile("linkedin.com/in/hank", "Hank Scorpio"))
        .await
        .unwrap();

    let meta = &outcome.resolution.meta_expert;
    let stored = &store.experts().await[0];
    assert_eq!(stored.jobs.len(), 1);
    assert_eq!(stored.jobs[0].id, meta.jobs[0].id);
    assert_eq!(stored.jobs[0].owner, JobOwner::MetaExpert(meta.id));
    assert_eq!(stored.jobs[0].seniority_level.as_deref(), Some("Director"));
}

#[tokio::test]
async fn test_merged_sighting_jobs_belong_to_existing_meta_expert() {
    let store = MemoryStore::new();
    let pipeline = pipeline(&store);
    let first = pipeline
        .ingest(OWNER, profile("linkedin.com/in/hank", "Hank Scorpio"))
        .await
        .unwrap();
    let second = pipeline
        .ingest(OWNER, profile("linkedin.com/in/hank", "Hank Scorpio"))
        .await
        .unwrap();

    let meta_id = first.resolution.meta_expert.id;
    assert_eq!(second.resolution.meta_expert.id, meta_id);
    for expert in store.experts().await {
        assert!(expert
            .jobs
            .iter()
            .all(|job| job.owner == JobOwner::MetaExpert(meta_id)));
    }
}

#[tokio::test]
async fn test_batch_continues_past_bad_profile() {
    let store = MemoryStore::new();
    let results = pipeline(&store)
        .ingest_batch(
            OWNER,
            vec![
                profile("linkedin.com/in/a", "Alice Able"),
                profile("https://example.com/not-a-profile", "Bob Baker"),
                profile("linkedin.com/in/c", "Carol Cole"),
            ],
        )
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(Error::InvalidInput(_))));
    assert!(results[2].is_ok());
    assert_eq!(store.experts().await.len(), 2);
}

#[tokio::test]
async fn test_photo_policy_applied_before_resolution() {
    let store = MemoryStore::new();
    let outcome = pipeline(&store)
        .with_photo_lookup(PhotoPolicy::default(), Arc::new(StaticLookup))
        .ingest(OWNER, profile("linkedin.com/in/hank", "Hank Scorpio"))
        .await
        .unwrap();

    let found = Some("https://media.licdn.com/dms/image/found");
    assert_eq!(outcome.expert.profile_picture_link.as_deref(), found);
    assert_eq!(
        outcome.resolution.meta_expert.profile_picture_link.as_deref(),
        found
    );
}
