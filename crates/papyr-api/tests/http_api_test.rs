//! HTTP surface tests against the in-memory store and mock generation backend.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use papyr_api::{build_router, ApiConfig, AppState, PaperService};
use papyr_core::{Result, TextExtractor};
use papyr_db::MemoryStore;
use papyr_inference::{LlmDigester, MockGenerationBackend};

const BOUNDARY: &str = "papyr-test-boundary";

struct StaticExtractor;

#[async_trait]
impl TextExtractor for StaticExtractor {
    async fn extract(&self, _data: &[u8], _filename: &str) -> Result<String> {
        Ok("The dominant sequence transduction models are based on attention.".to_string())
    }

    fn name(&self) -> &str {
        "static"
    }
}

fn app_with(backend: MockGenerationBackend) -> Router {
    let service = PaperService::in_memory(
        Arc::new(MemoryStore::new()),
        Arc::new(StaticExtractor),
        Arc::new(LlmDigester::new(Arc::new(backend))),
    );
    build_router(AppState::new(service, ApiConfig::default()))
}

fn app() -> Router {
    app_with(MockGenerationBackend::new())
}

fn multipart_body(filename: &str, data: &[u8], title: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(title) = title {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{title}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn upload(app: &Router, filename: &str, data: &[u8]) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/papers/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(filename, data, None)))
        .unwrap();
    send(app, request).await
}

async fn finalized_paper(app: &Router) -> String {
    let (status, body) = upload(app, "attention.pdf", b"%PDF-1.4 ...").await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["paper_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        app,
        json_request(
            "PUT",
            &format!("/papers/{id}/"),
            json!({
                "title": "Attention Is All You Need",
                "summary": "We propose the Transformer.",
                "keywords": ["machine learning", "Transformer", "Google"]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    id
}

async fn create_label(app: &Router, name: &str) -> Value {
    let (status, body) = send(app, json_request("POST", "/labels/", json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["base_url"], "http://0.0.0.0:8000");
}

#[tokio::test]
async fn test_request_id_header_is_set() {
    let response = app().oneshot(get("/health")).await.unwrap();
    let id = response.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert!(Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_upload_returns_id_and_text() {
    let app = app();
    let (status, body) = upload(&app, "attention.pdf", b"%PDF-1.4 ...").await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(Uuid::parse_str(body["paper_id"].as_str().unwrap()).is_ok());
    assert!(body["text"].as_str().unwrap().contains("attention"));
}

#[tokio::test]
async fn test_upload_uses_title_field() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/papers/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(
            "x.pdf",
            b"%PDF-1.4",
            Some("Deep Residual Learning"),
        )))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = send(&app, get("/papers/")).await;
    assert_eq!(list[0]["title"], "Deep Residual Learning");
    assert_eq!(list[0]["status"], "uploaded");
}

#[tokio::test]
async fn test_upload_rejects_non_pdf() {
    let (status, body) = upload(&app(), "notes.txt", b"plain text").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(body.get("retryable").is_none());
}

#[tokio::test]
async fn test_finalize_twice_is_conflict() {
    let app = app();
    let id = finalized_paper(&app).await;

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/papers/{id}/"),
            json!({ "title": "T", "summary": "S", "keywords": [] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("finalized"));
}

#[tokio::test]
async fn test_facet_endpoints() {
    let app = app();
    let id = finalized_paper(&app).await;

    let (status, body) = send(&app, get(&format!("/papers/{id}/get-summary/"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "summary": "We propose the Transformer." }));

    let (_, body) = send(&app, get(&format!("/papers/{id}/get-keywords/"))).await;
    assert_eq!(
        body,
        json!({ "keywords": ["machine learning", "Transformer", "Google"] })
    );

    let (_, body) = send(&app, get(&format!("/papers/{id}/get-labels/"))).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_unknown_paper_is_not_found() {
    let app = app();
    let id = Uuid::now_v7();
    for uri in [
        format!("/papers/{id}/"),
        format!("/papers/{id}/get-summary/"),
        format!("/papers/{id}/related-labels/"),
    ] {
        let (status, _) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn test_label_suggestion_and_attach_flow() {
    let app = app();
    let id = finalized_paper(&app).await;
    let transformer = create_label(&app, "Transformer").await;
    create_label(&app, "Database").await;

    let (status, related) = send(&app, get(&format!("/papers/{id}/related-labels/"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(related.as_array().unwrap().len(), 1);
    assert_eq!(related[0]["name"], "Transformer");
    assert_eq!(related[0]["is_attached"], false);
    assert_eq!(related[0]["match_kind"], "exact");

    let body = json!({ "label_id": transformer["id"] });
    let (status, detail) = send(
        &app,
        json_request("PUT", &format!("/papers/{id}/add-label/"), body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["attached_labels"][0]["name"], "Transformer");
    assert_eq!(detail["suggested_labels"], json!([]));

    // Attaching again is a no-op.
    let (status, _) = send(
        &app,
        json_request("PUT", &format!("/papers/{id}/add-label/"), body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, related) = send(&app, get(&format!("/papers/{id}/related-labels/"))).await;
    assert_eq!(related.as_array().unwrap().len(), 1);
    assert_eq!(related[0]["is_attached"], true);

    let (_, list) = send(&app, get("/papers/")).await;
    assert_eq!(list[0]["labels"].as_array().unwrap().len(), 1);

    for _ in 0..2 {
        let (status, detail) = send(
            &app,
            json_request("PUT", &format!("/papers/{id}/remove-label/"), body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["attached_labels"], json!([]));
        assert_eq!(detail["suggested_labels"][0]["name"], "Transformer");
    }
}

#[tokio::test]
async fn test_add_unknown_label_is_not_found() {
    let app = app();
    let id = finalized_paper(&app).await;
    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/papers/{id}/add-label/"),
            json!({ "label_id": Uuid::now_v7() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_label_create_is_idempotent() {
    let app = app();
    let first = create_label(&app, "Transformer").await;
    let second = create_label(&app, "  transformer ").await;
    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["name"], "Transformer");

    let (_, labels) = send(&app, get("/labels/")).await;
    assert_eq!(labels.as_array().unwrap().len(), 1);

    let id = first["id"].as_str().unwrap();
    let (status, label) = send(&app, get(&format!("/labels/{id}/"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(label["name"], "Transformer");
}

#[tokio::test]
async fn test_blank_label_name_is_bad_request() {
    let (status, _) = send(
        &app(),
        json_request("POST", "/labels/", json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_label_for_paper_does_not_attach() {
    let app = app();
    let id = finalized_paper(&app).await;

    let (status, body) = send(
        &app,
        json_request("POST", &format!("/papers/{id}/labels/"), json!({ "name": "Google" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"]["name"], "Google");
    assert_eq!(body["suggestions"][0]["is_attached"], false);

    let (_, labels) = send(&app, get(&format!("/papers/{id}/get-labels/"))).await;
    assert_eq!(labels, json!([]));
}

#[tokio::test]
async fn test_generate_finalizes_paper() {
    let backend = MockGenerationBackend::new().with_fixed_response(
        r#"{"summary": "Attention replaces recurrence.", "keywords": ["Transformer"]}"#,
    );
    let app = app_with(backend);
    let (_, body) = upload(&app, "attention.pdf", b"%PDF-1.4").await;
    let id = body["paper_id"].as_str().unwrap().to_string();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/papers/{id}/generate/?title=Attention"))
        .body(Body::empty())
        .unwrap();
    let (status, paper) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paper["status"], "finalized");
    assert_eq!(paper["title"], "Attention");
    assert_eq!(paper["keywords"], json!(["Transformer"]));
    assert!(paper.get("raw_text").is_none());
}

#[tokio::test]
async fn test_generate_failure_is_retryable_and_leaves_paper_uploaded() {
    let app = app_with(MockGenerationBackend::new().failing());
    let (_, body) = upload(&app, "attention.pdf", b"%PDF-1.4").await;
    let id = body["paper_id"].as_str().unwrap().to_string();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/papers/{id}/generate/"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["retryable"], true);

    let (_, list) = send(&app, get("/papers/")).await;
    assert_eq!(list[0]["status"], "uploaded");
}

#[tokio::test]
async fn test_summary_latex_download() {
    let app = app();
    let id = finalized_paper(&app).await;

    let response = app
        .clone()
        .oneshot(get(&format!("/papers/{id}/get-summary-latex/")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment;"));
    assert!(disposition.contains(".tex"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("We propose the Transformer."));
}

#[tokio::test]
async fn test_summary_latex_before_finalize_is_conflict() {
    let app = app();
    let (_, body) = upload(&app, "attention.pdf", b"%PDF-1.4").await;
    let id = body["paper_id"].as_str().unwrap();
    let (status, _) = send(&app, get(&format!("/papers/{id}/get-summary-latex/"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}
