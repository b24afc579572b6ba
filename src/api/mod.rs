//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/start-stop", post(start_stop_handler))
        .route("/pause-resume", post(pause_resume_handler))
        .route("/skip", post(skip_handler))
        .route("/add-minutes/:minutes", post(add_minutes_handler))
        .route("/choice/:action", post(choice_handler))
        .route("/command/:name", post(command_handler))
        .route("/presets", get(presets_handler))
        .route("/presets/current", put(replace_preset_handler))
        .route("/presets/:index/select", post(select_preset_handler))
        .route("/intervals/:phase/:minutes", post(interval_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
