//! papyr-api - HTTP API for papyr
//!
//! Router, shared state and the Paper Record Service. The binary in
//! `main.rs` wires these to PostgreSQL and Ollama.

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;

use std::sync::Arc;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, Method, Request},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;
use uuid::Uuid;

use papyr_core::logging;
use papyr_db::Database;

pub use config::ApiConfig;
pub use error::ApiError;
pub use services::PaperService;

/// Multipart framing allowance on top of the configured upload size.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PaperService>,
    pub config: Arc<ApiConfig>,
    /// Present when running against PostgreSQL; used by the health check.
    pub db: Option<Database>,
}

impl AppState {
    pub fn new(service: PaperService, config: ApiConfig) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
            db: None,
        }
    }

    pub fn with_database(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }
}

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

fn make_request_span(request: &Request<Body>) -> Span {
    let span = tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
    );
    if let Some(id) = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
    {
        span.record(logging::REQUEST_ID, id);
    }
    span
}

/// Build the application router with all middleware.
pub fn build_router(state: AppState) -> Router {
    use handlers::{labels, papers};

    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(state.config.cors_origins.clone()))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(handlers::health))
        // Papers
        .route("/papers/", get(papers::list_papers).post(papers::upload_paper))
        .route(
            "/papers/:id/",
            get(papers::get_paper).put(papers::finalize_paper),
        )
        .route("/papers/:id/generate/", post(papers::generate_paper))
        .route("/papers/:id/get-summary/", get(papers::get_summary))
        .route(
            "/papers/:id/get-summary-latex/",
            get(papers::get_summary_latex),
        )
        .route("/papers/:id/get-keywords/", get(papers::get_keywords))
        .route("/papers/:id/get-labels/", get(papers::get_labels))
        .route("/papers/:id/related-labels/", get(papers::related_labels))
        .route("/papers/:id/add-label/", put(papers::add_label))
        .route("/papers/:id/remove-label/", put(papers::remove_label))
        .route("/papers/:id/labels/", post(papers::create_label_for_paper))
        // Labels
        .route("/labels/", get(labels::list_labels).post(labels::create_label))
        .route("/labels/:id/", get(labels::get_label))
        // Middleware
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
