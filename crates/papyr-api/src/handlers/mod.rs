//! HTTP handlers for papyr-api.

pub mod labels;
pub mod papers;

use axum::{extract::State, Json};
use tracing::warn;

use crate::AppState;

/// Liveness and configuration check.
///
/// Reports `degraded` when the database does not answer.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let status = match &state.db {
        Some(db) => match db.ping().await {
            Ok(()) => "ok",
            Err(e) => {
                warn!(subsystem = "api", error = %e, "Database health check failed");
                "degraded"
            }
        },
        None => "ok",
    };

    Json(serde_json::json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "base_url": state.config.base_url,
    }))
}
