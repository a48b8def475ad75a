//! HTTP-level tests for the backend store against a local mock server.

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xpert_core::{
    Error, Expert, Job, MetaExpert, MetaExpertStore, SpendRecord, SpendRecorder, Tag,
};
use xpert_store::{HttpStore, StoreConfig};

fn store_for(server: &MockServer) -> HttpStore {
    HttpStore::new(
        StoreConfig::default()
            .with_base_url(server.uri())
            .with_token("backend-token"),
    )
    .expect("Failed to create store")
}

#[tokio::test]
async fn test_list_meta_experts_parses_envelope() {
    let server = MockServer::start().await;
    let meta_id = Uuid::new_v4();
    let job_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/meta-experts/owner@example.com"))
        .and(header("Authorization", "Bearer backend-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metaExperts": [{
                "id": meta_id,
                "name": "Jane Doe",
                "organizationId": "org-1",
                "profession": null,
                "company": "Acme",
                "linkedInLink": "https://www.linkedin.com/in/jane",
                "fraudFlag": null,
                "strikes": 2,
                "jobs": [{
                    "id": job_id,
                    "role": "Engineer",
                    "isEducation": false,
                    "metaExpertId": meta_id,
                    "expertId": null
                }]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let metas = store_for(&server)
        .list_meta_experts("owner@example.com")
        .await
        .unwrap();

    assert_eq!(metas.len(), 1);
    let meta = &metas[0];
    assert_eq!(meta.id, meta_id);
    assert_eq!(meta.profession, "");
    assert!(!meta.fraud_flag);
    assert_eq!(meta.strikes, 2);
    assert_eq!(meta.jobs[0].owner.meta_expert_id(), Some(meta_id));
}

#[tokio::test]
async fn test_list_meta_experts_missing_key_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/meta-experts/o"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert!(store_for(&server).list_meta_experts("o").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_failure_is_storage_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/meta-experts/o"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;

    let err = store_for(&server).list_meta_experts("o").await.unwrap_err();
    match err {
        Error::Storage(msg) => assert!(msg.contains("500")),
        other => panic!("expected storage error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_and_update_meta_expert() {
    let server = MockServer::start().await;

    let mut expert = Expert::new("Jane Doe");
    expert.jobs.push(Job::for_expert(expert.id));
    let meta = MetaExpert::from_expert(&expert);

    Mock::given(method("POST"))
        .and(path("/meta-expert/o"))
        .and(body_partial_json(json!({
            "id": meta.id,
            "profession": "Missing Job",
            "company": "Missing Company",
            "strikes": 0,
            "fraudFlag": false
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/meta-expert/o"))
        .and(body_partial_json(json!({"id": meta.id})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.create_meta_expert("o", &meta).await.unwrap();
    store.update_meta_expert("o", &meta).await.unwrap();
}

#[tokio::test]
async fn test_create_tags_posts_array() {
    let server = MockServer::start().await;
    let meta_id = Uuid::new_v4();
    let tags = vec![Tag::new("Rust", meta_id), Tag::new("Kubernetes", meta_id)];

    Mock::given(method("POST"))
        .and(path(format!("/meta-expert-tags/{}", meta_id)))
        .and(body_partial_json(json!([
            {"tag": "Rust", "metaExpertId": meta_id},
            {"tag": "Kubernetes", "metaExpertId": meta_id}
        ])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server).create_tags(meta_id, &tags).await.unwrap();
}

#[tokio::test]
async fn test_create_expert_and_spend() {
    let server = MockServer::start().await;
    let mut expert = Expert::new("Jane Doe");
    expert.meta_expert_id = Some(Uuid::new_v4());

    Mock::given(method("POST"))
        .and(path("/expert/o"))
        .and(body_partial_json(json!({"name": "Jane Doe", "metaExpertId": expert.meta_expert_id})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/spend"))
        .and(body_partial_json(json!({"model": "gpt-4o-mini", "spend": 0.0025})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.create_expert("o", &expert).await.unwrap();
    store
        .record_spend(&SpendRecord::new("gpt-4o-mini", 0.0025))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_write_rejection_is_storage_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/expert/o"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad payload"))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .create_expert("o", &Expert::new("x"))
        .await
        .unwrap_err();
    match err {
        Error::Storage(msg) => assert!(msg.contains("bad payload")),
        other => panic!("expected storage error, got {:?}", other),
    }
}
