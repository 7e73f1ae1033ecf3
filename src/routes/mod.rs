//! Route modules for Podcast Workshop

pub mod book;
pub mod cover;
pub mod generate;
pub mod health;
pub mod history;
pub mod publish;
pub mod script;
pub mod workflow;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_upload_bytes = state.config().server.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/health", get(health::health_check))
        .nest("/api/v1/workflow", workflow::router())
        .nest("/api/v1/book", book::router(max_upload_bytes))
        .nest("/api/v1/script", script::router())
        .nest("/api/v1/cover", cover::router())
        .nest("/api/v1/history", history::router())
        .nest("/api/v1/publish", publish::router())
        .nest("/api/v1/generate", generate::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
