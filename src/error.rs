//! Error types for the timer library

use std::path::PathBuf;

use thiserror::Error;

use crate::state::{Event, Phase};

/// Preset validation and loading errors
#[derive(Error, Debug)]
pub enum PresetError {
    #[error("{phase} length must be within (0, {max}] minutes, got {minutes}")]
    InvalidLength { phase: Phase, minutes: f64, max: f64 },

    #[error("work intervals per set must be within [1, {max}], got {count}")]
    InvalidIntervalCount { count: u32, max: u32 },

    #[error("preset index {index} out of range (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("idle has no interval length")]
    NoLengthForIdle,

    #[error("failed to read presets from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse presets: {0}")]
    Json(#[from] serde_json::Error),
}

/// Focus-mode (do not disturb) collaborator errors
#[derive(Error, Debug)]
pub enum FocusError {
    #[error("no focus-mode command configured")]
    Unavailable,

    #[error("failed to spawn focus-mode command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// An event arrived in a phase with no matching guarded route
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no transition for event {event} from phase {from}")]
pub struct InvalidTransition {
    pub from: Phase,
    pub event: Event,
}

/// Errors surfaced through the engine handle
#[derive(Error, Debug)]
pub enum HandleError {
    #[error("timer engine is not running")]
    EngineStopped,

    #[error(transparent)]
    Preset(#[from] PresetError),
}
