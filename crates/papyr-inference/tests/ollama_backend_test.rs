//! Ollama backend against a stubbed HTTP server.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use papyr_core::{Error, GenerationBackend, PaperDigester};
use papyr_inference::{LlmDigester, OllamaBackend};

fn chat_reply(content: &str) -> serde_json::Value {
    json!({
        "model": "test-model",
        "message": {"role": "assistant", "content": content},
        "done": true
    })
}

fn backend_for(server: &MockServer, timeout_secs: u64) -> OllamaBackend {
    OllamaBackend::with_config(server.uri(), "test-model".to_string(), timeout_secs)
}

#[tokio::test]
async fn test_generate_json_posts_chat_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"model": "test-model", "stream": false, "format": "json"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("{\"ok\": true}")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server, 5);
    let out = backend
        .generate_json_with_system("system", "prompt")
        .await
        .unwrap();
    assert_eq!(out, "{\"ok\": true}");
}

#[tokio::test]
async fn test_server_error_maps_to_inference() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let err = backend_for(&server, 5).generate("prompt").await.unwrap_err();
    match err {
        Error::Inference(msg) => assert!(msg.contains("model not loaded")),
        other => panic!("expected Inference, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_server_maps_to_upstream_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_reply("late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = backend_for(&server, 1).generate("prompt").await.unwrap_err();
    assert!(matches!(err, Error::UpstreamTimeout(_)), "got {err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&server)
        .await;

    assert!(backend_for(&server, 5).health_check().await.unwrap());
}

#[tokio::test]
async fn test_digester_end_to_end() {
    let server = MockServer::start().await;
    let content = "```json\n{\"summary\": \"We propose the Transformer.\", \"keywords\": [\"Transformer\", \"attention\", \"Transformer\"]}\n```";
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(content)))
        .mount(&server)
        .await;

    let digester = LlmDigester::new(Arc::new(backend_for(&server, 5)));
    let digest = digester
        .digest("Attention Is All You Need", "The dominant sequence models...")
        .await
        .unwrap();

    assert_eq!(digest.summary, "We propose the Transformer.");
    assert_eq!(digest.keywords, vec!["Transformer", "attention"]);
}

#[tokio::test]
async fn test_digester_rejects_non_json_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("I cannot do that.")))
        .mount(&server)
        .await;

    let digester = LlmDigester::new(Arc::new(backend_for(&server, 5)));
    let err = digester.digest("T", "text").await.unwrap_err();
    assert!(matches!(err, Error::Inference(_)));
}
