//! State management module
//! 
//! This module contains the timer's value types and the HTTP server state.

pub mod app_state;
pub mod phase;
pub mod preset;
pub mod signal;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use phase::{Event, Phase, SessionStopAfter, StartPhase};
pub use preset::{Preset, PresetStore};
pub use signal::Signal;
pub use timer_state::TimerState;
