//! Paper HTTP handlers.
//!
//! Upload, finalize and generate drive the paper lifecycle; the remaining
//! handlers read facets of a paper or mutate its labels. Label mutations
//! answer with the recomputed detail view so the client never has to merge
//! attached and suggested state itself.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use papyr_core::{Label, LabelSuggestion, Paper, PaperDetail, PaperListItem, UploadedPaper};

use crate::services::LabelSelection;
use crate::{ApiError, AppState};

/// Request body for finalizing an uploaded paper.
#[derive(Debug, Deserialize)]
pub struct FinalizePaperRequest {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Query parameters for server-side generation.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuery {
    /// Title to use instead of the stored one.
    pub title: Option<String>,
}

/// Request body identifying a label by id.
#[derive(Debug, Deserialize)]
pub struct LabelRefRequest {
    pub label_id: Uuid,
}

/// Request body naming a label.
#[derive(Debug, Deserialize)]
pub struct LabelNameRequest {
    pub name: String,
}

/// Upload a PDF.
///
/// # Multipart Fields
/// - `file`: the PDF (required)
/// - `title`: explicit title (optional, defaults to the file name)
///
/// # Returns
/// - 201 Created with `{paper_id, text}`
/// - 400 Bad Request if the file is missing, empty, too large or not a PDF
/// - 503 Service Unavailable if text extraction timed out
pub async fn upload_paper(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadedPaper>), ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut title: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload.pdf").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Read error: {}", e)))?;
                file = Some((filename, data.to_vec()));
            }
            Some("title") => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Read error: {}", e)))?,
                );
            }
            _ => {}
        }
    }

    let (filename, data) =
        file.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;

    let uploaded = state
        .service
        .upload(&filename, &data, title.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(uploaded)))
}

/// Set title, summary and keywords; transitions the paper to `finalized`.
///
/// # Returns
/// - 200 OK with the finalized paper
/// - 400 Bad Request if title or summary is blank
/// - 404 Not Found if the paper does not exist
/// - 409 Conflict if the paper is already finalized
pub async fn finalize_paper(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<FinalizePaperRequest>,
) -> Result<Json<Paper>, ApiError> {
    let paper = state
        .service
        .finalize_upload(id, &req.title, &req.summary, &req.keywords)
        .await?;
    Ok(Json(paper))
}

/// Generate summary and keywords with the inference backend, then finalize.
///
/// # Returns
/// - 200 OK with the finalized paper
/// - 409 Conflict if the paper is already finalized
/// - 503 Service Unavailable if generation timed out (paper unchanged)
pub async fn generate_paper(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<GenerateQuery>,
) -> Result<Json<Paper>, ApiError> {
    let paper = state.service.generate(id, query.title.as_deref()).await?;
    Ok(Json(paper))
}

pub async fn list_papers(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaperListItem>>, ApiError> {
    Ok(Json(state.service.list_papers().await?))
}

/// Composite detail view: summary, keywords, attached and suggested labels.
pub async fn get_paper(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaperDetail>, ApiError> {
    Ok(Json(state.service.get_detail(id).await?))
}

pub async fn get_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let summary = state.service.get_summary(id).await?;
    Ok(Json(serde_json::json!({ "summary": summary })))
}

pub async fn get_keywords(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let keywords = state.service.get_keywords(id).await?;
    Ok(Json(serde_json::json!({ "keywords": keywords })))
}

pub async fn get_labels(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Label>>, ApiError> {
    Ok(Json(state.service.get_labels(id).await?))
}

/// Download the summary as a `.tex` document.
///
/// # Returns
/// - 200 OK with `application/x-tex` attachment
/// - 409 Conflict if the paper has no summary yet
pub async fn get_summary_latex(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let doc = state.service.summary_latex(id).await?;
    let filename: String = doc
        .filename
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .collect();

    Ok((
        [
            (header::CONTENT_TYPE, "application/x-tex; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        doc.body,
    ))
}

/// Keyword-matched labels, each tagged `is_attached`.
pub async fn related_labels(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LabelSuggestion>>, ApiError> {
    Ok(Json(state.service.related_labels(id).await?))
}

/// Attach a label. Idempotent.
///
/// # Returns
/// - 200 OK with the recomputed detail view
/// - 404 Not Found if the paper or label does not exist
pub async fn add_label(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<LabelRefRequest>,
) -> Result<Json<PaperDetail>, ApiError> {
    Ok(Json(state.service.attach_label(id, req.label_id).await?))
}

/// Detach a label. Detaching a label that is not attached is a no-op.
pub async fn remove_label(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<LabelRefRequest>,
) -> Result<Json<PaperDetail>, ApiError> {
    Ok(Json(state.service.detach_label(id, req.label_id).await?))
}

/// Create (or reuse) a label from the paper page without attaching it.
pub async fn create_label_for_paper(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<LabelNameRequest>,
) -> Result<Json<LabelSelection>, ApiError> {
    Ok(Json(state.service.create_label_and_select(id, &req.name).await?))
}
