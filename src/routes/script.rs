//! Script generation
//!
//! - POST /api/v1/script - Generate a script for the uploaded book

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::error::Result;
use crate::state::AppState;
use crate::workflow::{run_script, WorkflowError};

use super::workflow::snapshot;

#[derive(Debug, Deserialize)]
pub struct ScriptBody {
    /// Custom prompt; blank falls back to the default prompt
    #[serde(default)]
    pub prompt: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(generate_script))
}

async fn generate_script(
    State(state): State<AppState>,
    body: Option<Json<ScriptBody>>,
) -> Result<Json<serde_json::Value>> {
    let prompt = body.and_then(|Json(body)| body.prompt);

    // Detached so a dropped connection cannot leave the step loading
    let task_state = state.clone();
    tokio::spawn(async move { run_script(task_state.workshop(), prompt.as_deref()).await })
        .await
        .map_err(WorkflowError::from)??;

    let workshop = state.workshop().lock().await;
    snapshot(&*workshop)
}

#[cfg(test)]
mod tests {
    use super::super::testing::test_server;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_script_without_book() {
        let (server, _dir) = test_server();

        let response = server.post("/api/v1/script").json(&json!({})).await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<serde_json::Value>()["error"], "no_book_loaded");
    }
}
