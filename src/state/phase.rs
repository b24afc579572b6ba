//! Phase, event and session-setting enums shared by the engine and its collaborators

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The phase the engine is currently in. Exactly one is live at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Work,
    ShortRest,
    LongRest,
}

impl Phase {
    pub fn is_idle(self) -> bool {
        self == Phase::Idle
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Work => "work",
            Phase::ShortRest => "shortRest",
            Phase::LongRest => "longRest",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "idle" => Ok(Phase::Idle),
            "work" => Ok(Phase::Work),
            "shortrest" => Ok(Phase::ShortRest),
            "longrest" => Ok(Phase::LongRest),
            other => Err(format!("unknown phase: {}", other)),
        }
    }
}

/// Stimuli accepted by the state machine. Events are the only way the phase changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Event {
    StartStop,
    IntervalCompleted,
    SessionCompleted,
    Skip,
    ConfirmedNext,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Event::StartStop => "startStop",
            Event::IntervalCompleted => "intervalCompleted",
            Event::SessionCompleted => "sessionCompleted",
            Event::Skip => "skip",
            Event::ConfirmedNext => "confirmedNext",
        };
        f.write_str(name)
    }
}

/// Which phase a session enters when started from idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StartPhase {
    #[default]
    Work,
    Rest,
}

/// After which kind of phase a session ends on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStopAfter {
    #[default]
    Disabled,
    Work,
    ShortRest,
    LongRest,
}
