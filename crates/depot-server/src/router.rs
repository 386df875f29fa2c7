use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use depot::Storage;

use crate::handler;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

/// Build the axum router with all Depot endpoints.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handler::health))
        .route(
            "/message",
            get(handler::list_messages).post(handler::write_message),
        )
        .route("/message/:key", get(handler::read_message))
        .route("/message/:key/backlog", get(handler::message_backlog))
        .route("/attachment/:digest", get(handler::read_attachment))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
