//! Tomato Timer - A pomodoro interval scheduler
//!
//! This is the main entry point for the tomato-timer server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use tomato_timer::{
    api::create_router,
    config::Config,
    services::{BroadcastSink, CommandFocus, FocusMode, NoFocus},
    state::{AppState, Preset, PresetStore},
    tasks::{signal_logger_task, spawn_engine, EngineParts},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("tomato_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting tomato-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, preset={}, alert={:?}/{:?}",
        config.host, config.port, config.preset, config.alert_mode, config.notify_style
    );

    let mut presets = match &config.presets {
        Some(path) => PresetStore::load_or_default(path),
        None => PresetStore::default(),
    };
    if config.test_mode {
        info!("Test mode: preset 0 uses few-second intervals");
        presets.replace(0, Preset::test_mode())?;
    }
    presets.select(config.preset)?;

    let focus: Box<dyn FocusMode> = match &config.focus_on_command {
        Some(on) => Box::new(CommandFocus::new(
            on.clone(),
            config.focus_off_command.clone().unwrap_or_default(),
        )),
        None => Box::new(NoFocus),
    };

    // Fan signals out to the logger before the engine can emit any
    let sink = BroadcastSink::new(64);
    tokio::spawn(signal_logger_task(sink.subscribe()));

    let engine = spawn_engine(EngineParts {
        presets,
        policy: Box::new(config.alert_policy()),
        focus,
        sink: Box::new(sink),
        options: config.engine_options(),
    });

    if config.start_on_launch {
        let timer = engine.start_stop().await?;
        info!("Started on launch: {} {}", timer.phase, timer.time_left);
    }

    // Create HTTP router with all endpoints
    let state = Arc::new(AppState::new(engine, config.port, config.host.clone()));
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start-stop               - Start or stop a session");
    info!("  POST /pause-resume             - Pause or resume the running phase");
    info!("  POST /skip                     - Skip the running phase");
    info!("  POST /add-minutes/:minutes     - Extend the running phase");
    info!("  POST /choice/:action           - Answer a finished phase");
    info!("  POST /command/:name            - URL-scheme commands");
    info!("  GET  /presets                  - List presets");
    info!("  PUT  /presets/current          - Replace the current preset");
    info!("  POST /presets/:index/select    - Select a preset");
    info!("  POST /intervals/:phase/:minutes - Edit an interval length");
    info!("  GET  /status                   - Timer state and server info");
    info!("  GET  /health                   - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
