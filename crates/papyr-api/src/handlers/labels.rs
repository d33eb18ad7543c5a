//! Label HTTP handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use papyr_core::Label;

use super::papers::LabelNameRequest;
use crate::{ApiError, AppState};

pub async fn list_labels(State(state): State<AppState>) -> Result<Json<Vec<Label>>, ApiError> {
    Ok(Json(state.service.list_labels().await?))
}

/// Create a label.
///
/// Creating a name that already exists (case-insensitively) returns the
/// stored label instead of a duplicate.
///
/// # Returns
/// - 201 Created with the label
/// - 400 Bad Request if the name is blank or too long
pub async fn create_label(
    State(state): State<AppState>,
    Json(req): Json<LabelNameRequest>,
) -> Result<(StatusCode, Json<Label>), ApiError> {
    let label = state.service.create_label(&req.name).await?;
    Ok((StatusCode::CREATED, Json(label)))
}

pub async fn get_label(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Label>, ApiError> {
    Ok(Json(state.service.get_label(id).await?))
}
