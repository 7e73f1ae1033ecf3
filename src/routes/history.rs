//! Generation history
//!
//! - GET /api/v1/history - Remembered scripts, newest first
//! - POST /api/v1/history/:id/load - Reopen a script
//! - DELETE /api/v1/history/:id - Forget a script

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};

use crate::error::Result;
use crate::history::HistoryItem;
use crate::state::AppState;

use super::workflow::snapshot;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_history))
        .route("/:id/load", post(load_item))
        .route("/:id", delete(delete_item))
}

async fn list_history(State(state): State<AppState>) -> Json<Vec<HistoryItem>> {
    let workshop = state.workshop().lock().await;
    Json(workshop.history().to_vec())
}

async fn load_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let mut workshop = state.workshop().lock().await;
    workshop.load_from_history(&id)?;
    snapshot(&*workshop)
}

async fn delete_item(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let mut workshop = state.workshop().lock().await;
    workshop.delete_history_item(&id).await?;
    tracing::info!(id = %id, "Deleted history item");
    Ok(StatusCode::NO_CONTENT)
}
