//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    engine::UserChoice,
    error::HandleError,
    state::{AppState, Phase, Preset, TimerState},
    tasks::Command,
};
use super::responses::{ApiResponse, HealthResponse, PresetsResponse, StatusResponse};

type ApiResult = Result<Json<ApiResponse>, StatusCode>;

fn status_for(action: &str, e: HandleError) -> StatusCode {
    match e {
        HandleError::EngineStopped => {
            error!("{} failed: {}", action, e);
            StatusCode::SERVICE_UNAVAILABLE
        }
        HandleError::Preset(e) => {
            warn!("{} rejected: {}", action, e);
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn respond(
    state: &AppState,
    action: &str,
    result: Result<TimerState, HandleError>,
) -> ApiResult {
    state.record_action(action);
    match result {
        Ok(timer) => {
            info!("{} endpoint called - {} {}", action, timer.phase, timer.time_left);
            Ok(Json(ApiResponse::for_timer(format!("{} applied", action), timer)))
        }
        Err(e) => Err(status_for(action, e)),
    }
}

/// Handle POST /start-stop - Start a session from idle, or stop the running one
pub async fn start_stop_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let result = state.engine.start_stop().await;
    respond(&state, "start-stop", result)
}

/// Handle POST /pause-resume
pub async fn pause_resume_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let result = state.engine.pause_resume().await;
    respond(&state, "pause-resume", result)
}

/// Handle POST /skip - End the running phase early
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let result = state.engine.skip_interval().await;
    respond(&state, "skip", result)
}

/// Handle POST /add-minutes/:minutes
pub async fn add_minutes_handler(
    State(state): State<Arc<AppState>>,
    Path(minutes): Path<u32>,
) -> ApiResult {
    let result = state.engine.add_minutes(minutes).await;
    respond(&state, "add-minutes", result)
}

/// Handle POST /choice/:action - Answer a finished phase that is waiting on the user
pub async fn choice_handler(
    State(state): State<Arc<AppState>>,
    Path(action): Path<String>,
) -> ApiResult {
    let choice: UserChoice = action.parse().map_err(|e| {
        warn!("{}", e);
        StatusCode::BAD_REQUEST
    })?;
    let result = state.engine.user_choice(choice).await;
    respond(&state, "choice", result)
}

/// Handle POST /command/:name - URL-scheme style command names
pub async fn command_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult {
    let command: Command = name.parse().map_err(|e| {
        warn!("{}", e);
        StatusCode::NOT_FOUND
    })?;
    let result = state.engine.dispatch(command).await;
    respond(&state, &command.to_string(), result)
}

/// Handle GET /presets
pub async fn presets_handler(State(state): State<Arc<AppState>>) -> Result<Json<PresetsResponse>, StatusCode> {
    match state.engine.presets().await {
        Ok(view) => Ok(Json(PresetsResponse {
            current: view.current,
            presets: view.presets,
        })),
        Err(e) => Err(status_for("presets", e)),
    }
}

/// Handle PUT /presets/current - Replace the current preset
pub async fn replace_preset_handler(
    State(state): State<Arc<AppState>>,
    Json(preset): Json<Preset>,
) -> ApiResult {
    let result = state.engine.replace_current_preset(preset).await;
    respond(&state, "replace-preset", result)
}

/// Handle POST /presets/:index/select
pub async fn select_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> ApiResult {
    let result = state.engine.select_preset(index).await;
    respond(&state, "select-preset", result)
}

/// Handle POST /intervals/:phase/:minutes - Live edit of one interval length
pub async fn interval_handler(
    State(state): State<Arc<AppState>>,
    Path((phase, minutes)): Path<(String, f64)>,
) -> ApiResult {
    let phase: Phase = phase.parse().map_err(|e| {
        warn!("{}", e);
        StatusCode::BAD_REQUEST
    })?;
    let result = state.engine.set_interval_minutes(phase, minutes).await;
    respond(&state, "set-interval", result)
}

/// Handle GET /status - Timer state and server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = state
        .engine
        .snapshot()
        .await
        .map_err(|e| status_for("status", e))?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Simple health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
