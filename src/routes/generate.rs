//! Model proxy endpoint
//!
//! - POST /api/v1/generate - `{action, payload}` RPC, the target of
//!   `GENERATION_ENDPOINT` on other deployments
//!
//! Failures answer 500 with `{error}` so remote clients can show the message.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use crate::generation::{RpcEnvelope, RpcError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(generate))
}

async fn generate(State(state): State<AppState>, Json(envelope): Json<RpcEnvelope>) -> Response {
    let action = envelope.action.clone();
    match state.proxy().handle(envelope).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            tracing::error!(action = %action, error = %e, "Generation request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RpcError { error: e.to_string() }),
            )
                .into_response()
        }
    }
}
