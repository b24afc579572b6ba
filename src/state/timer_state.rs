//! Observable timer state published after every engine step

use serde::{Deserialize, Serialize};

use super::Phase;

/// Read-only snapshot of the engine for collaborators and the HTTP surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub phase: Phase,
    pub paused: bool,
    /// Countdown hit zero and the policy asked for a user decision
    pub awaiting_choice: bool,
    /// Whether a phase countdown is armed
    pub active: bool,
    pub remaining_seconds: u64,
    /// Formatted remaining time, e.g. `24:59` or `1:05:00`
    pub time_left: String,
    /// `time_left` plus set progress when relevant, e.g. `24:59 (2/4)`
    pub display: String,
    pub current_preset: usize,
    pub current_work_interval: u32,
    pub work_intervals_per_set: u32,
}
