//! FlowHivee learning platform core.
//!
//! Progress tracking, profile settings, classroom analytics and the community board,
//! all over a pluggable key-value store, plus the HTTP service that hosts the shared
//! community board.

pub mod analytics;
pub mod api;
pub mod auth;
pub mod community;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod progress;
pub mod registry;
pub mod session;
pub mod settings;
pub mod storage;
pub mod training;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use community::MessageFile;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub messages: Arc<MessageFile>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // Browsers load the front-end from another origin on the LAN
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/community/messages",
            get(api::list_messages).post(api::create_message),
        )
        .route("/community/messages/{id}/like", post(api::toggle_like));

    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
