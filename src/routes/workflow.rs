//! Workflow state and step navigation
//!
//! - GET /api/v1/workflow - Current wizard state
//! - POST /api/v1/workflow/step - Jump to a step

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::generation::Generator;
use crate::state::AppState;
use crate::workflow::{WorkflowState, Workshop};

/// Wizard state as sent to the browser
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowView<'a> {
    #[serde(flatten)]
    state: &'a WorkflowState,
    book_name: String,
}

#[derive(Debug, Deserialize)]
pub struct StepRequest {
    pub step: u8,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_workflow))
        .route("/step", post(go_to_step))
}

/// Serialize the workshop state while the lock is held
pub(crate) fn snapshot<G: Generator>(workshop: &Workshop<G>) -> Result<Json<serde_json::Value>> {
    let view = WorkflowView {
        state: workshop.state(),
        book_name: workshop.book_name(),
    };
    serde_json::to_value(view)
        .map(Json)
        .map_err(|e| AppError::Internal(e.to_string()))
}

async fn get_workflow(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let workshop = state.workshop().lock().await;
    snapshot(&*workshop)
}

async fn go_to_step(
    State(state): State<AppState>,
    Json(request): Json<StepRequest>,
) -> Result<Json<serde_json::Value>> {
    let mut workshop = state.workshop().lock().await;
    workshop.go_to_step(request.step)?;
    snapshot(&*workshop)
}
