//! - GET /api/v1/publish - Discovery and publishing links

use axum::{extract::State, routing::get, Json, Router};

use crate::state::AppState;
use crate::workflow::PublishDestination;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(destinations))
}

async fn destinations(State(state): State<AppState>) -> Json<Vec<PublishDestination>> {
    let workshop = state.workshop().lock().await;
    Json(workshop.publish_destinations())
}
