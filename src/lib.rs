//! Tomato Timer - A pomodoro interval scheduler
//!
//! This library provides the interval state machine, its tokio runtime
//! and an HTTP surface for driving it. Sessions alternate work and rest
//! phases according to the selected preset.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use engine::{Engine, EngineOptions, UserChoice};
pub use error::{HandleError, PresetError};
pub use state::{AppState, Phase, Preset, PresetStore, Signal, TimerState};
pub use tasks::{spawn_engine, EngineHandle, EngineParts};
pub use utils::signals::shutdown_signal;
