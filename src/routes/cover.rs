//! Cover generation and overlay editing
//!
//! - POST /api/v1/cover - Generate a new cover
//! - POST /api/v1/cover/edit - Enter edit mode
//! - DELETE /api/v1/cover/edit - Leave edit mode without saving
//! - PUT /api/v1/cover/overlay - Replace the text overlay
//! - GET /api/v1/cover/layout - Draw commands for the current overlay
//! - POST /api/v1/cover/save - Store the rendered cover

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::cover::{AdvanceMeasurer, DrawList, TextOverlayConfig};
use crate::error::Result;
use crate::state::AppState;
use crate::workflow::{run_cover, WorkflowError};

use super::workflow::snapshot;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCoverRequest {
    /// Rendered canvas as a PNG data URL
    pub data_url: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(generate_cover))
        .route("/edit", post(begin_edit).delete(cancel_edit))
        .route("/overlay", put(update_overlay))
        .route("/layout", get(layout))
        .route("/save", post(save_cover))
}

async fn generate_cover(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let task_state = state.clone();
    tokio::spawn(async move { run_cover(task_state.workshop()).await })
        .await
        .map_err(WorkflowError::from)??;

    let workshop = state.workshop().lock().await;
    snapshot(&*workshop)
}

async fn begin_edit(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let mut workshop = state.workshop().lock().await;
    workshop.begin_cover_edit()?;
    snapshot(&*workshop)
}

async fn cancel_edit(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let mut workshop = state.workshop().lock().await;
    workshop.cancel_cover_edit();
    snapshot(&*workshop)
}

async fn update_overlay(
    State(state): State<AppState>,
    Json(overlay): Json<TextOverlayConfig>,
) -> Result<Json<serde_json::Value>> {
    let mut workshop = state.workshop().lock().await;
    workshop.update_overlay(overlay);
    snapshot(&*workshop)
}

async fn layout(State(state): State<AppState>) -> Result<Json<DrawList>> {
    let workshop = state.workshop().lock().await;
    let list = workshop.cover_layout(&AdvanceMeasurer::default())?;
    Ok(Json(list))
}

async fn save_cover(
    State(state): State<AppState>,
    Json(request): Json<SaveCoverRequest>,
) -> Result<Json<serde_json::Value>> {
    let mut workshop = state.workshop().lock().await;
    workshop.save_edited_cover(request.data_url)?;
    snapshot(&*workshop)
}
