//! HTTP-level tests for the OpenAI-compatible backend and the gateway on top
//! of it, against a local mock server.

#![cfg(feature = "openai")]

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xpert_core::{CompletionBackend, Error};
use xpert_inference::openai::{OpenAIBackend, OpenAIConfig, JSON_SYSTEM_PROMPT};
use xpert_inference::{find_success, GatewayConfig, LlmGateway, LlmRequest};

fn backend_for(server: &MockServer, api_key: Option<&str>) -> OpenAIBackend {
    let config = OpenAIConfig {
        base_url: server.uri(),
        api_key: api_key.map(String::from),
        timeout_seconds: 10,
        json_mode: true,
    };
    OpenAIBackend::new(config).expect("Failed to create backend")
}

fn chat_response(content: &str, total_tokens: u32) -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": total_tokens / 2,
            "completion_tokens": total_tokens - total_tokens / 2,
            "total_tokens": total_tokens
        }
    })
}

#[tokio::test]
async fn test_completion_sends_json_mode_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": JSON_SYSTEM_PROMPT},
                {"role": "user", "content": "classify this"}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_response(r#"{"seniority":"Senior"}"#, 42)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server, Some("sk-test"));
    let completion = backend
        .complete("classify this", "gpt-4o-mini")
        .await
        .expect("completion should succeed");

    assert_eq!(completion.content, r#"{"seniority":"Senior"}"#);
    assert_eq!(completion.total_tokens, 42);
}

#[tokio::test]
async fn test_missing_usage_counts_zero_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "{}"},
                "finish_reason": null
            }]
        })))
        .mount(&server)
        .await;

    let completion = backend_for(&server, None).complete("p", "m").await.unwrap();
    assert_eq!(completion.total_tokens, 0);
}

#[tokio::test]
async fn test_empty_choices_is_inference_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = backend_for(&server, None).complete("p", "m").await.unwrap_err();
    assert!(matches!(err, Error::Inference(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_status_errors_are_mapped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer bad-key"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key", "type": "invalid_request_error", "code": "invalid_api_key"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer busy-key"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Slow down", "type": "requests", "code": null}
        })))
        .mount(&server)
        .await;

    let err = backend_for(&server, Some("bad-key"))
        .complete("p", "m")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)), "got {:?}", err);

    let err = backend_for(&server, Some("busy-key"))
        .complete("p", "m")
        .await
        .unwrap_err();
    match err {
        Error::Inference(msg) => assert!(msg.contains("Rate limit")),
        other => panic!("expected inference error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gateway_unwraps_fenced_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_response("```json\n{\"tags\": [\"Rust\"]}\n```", 10)),
        )
        .mount(&server)
        .await;

    let gateway = LlmGateway::new(
        Arc::new(backend_for(&server, None)),
        GatewayConfig::default(),
    );
    let responses = gateway
        .run_batch(vec![LlmRequest::new("tags", "p", "gpt-4o-mini")])
        .await;

    assert_eq!(responses.len(), 1);
    assert_eq!(find_success(&responses, "tags"), Some(&json!({"tags": ["Rust"]})));
}

#[tokio::test]
async fn test_gateway_server_error_becomes_error_entry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let gateway = LlmGateway::new(
        Arc::new(backend_for(&server, None)),
        GatewayConfig::default(),
    );
    let response = gateway.run_one(LlmRequest::new("x", "p", "m")).await;

    assert_eq!(response.id, "x");
    assert!(!response.is_success());
}
