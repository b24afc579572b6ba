//! Outbound signals fired at phase boundaries

use serde::{Deserialize, Serialize};

use super::Phase;

/// What happened, for UI, audio and focus collaborators to react to.
/// The engine never renders or plays anything itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Signal {
    IdleEntered,
    IdleExited,
    WorkStarted {
        interval: u32,
    },
    WorkEnded,
    #[serde(rename_all = "camelCase")]
    RestStarted {
        is_long: bool,
        is_auto_transition: bool,
        /// Work was skipped straight into this rest; full-screen presenters show it seamlessly.
        via_skip: bool,
    },
    #[serde(rename_all = "camelCase")]
    RestEnded {
        was_skipped: bool,
    },
    SessionCompleted,
    #[serde(rename_all = "camelCase")]
    UserChoiceRequired {
        phase: Phase,
        next_is_long_rest: bool,
    },
    /// The countdown of `phase` reached zero
    IntervalElapsed {
        phase: Phase,
    },
    PauseToggled {
        phase: Phase,
        paused: bool,
    },
    Skipped {
        from: Phase,
    },
}

impl Signal {
    /// Whether a notification presenter should announce this rest start
    pub fn announces_rest(&self) -> bool {
        matches!(
            self,
            Signal::RestStarted { is_auto_transition: true, .. }
                | Signal::RestStarted { via_skip: true, .. }
        )
    }

    /// Whether a presenter should show a "rest finished" notification
    pub fn announces_rest_end(&self) -> bool {
        matches!(self, Signal::RestEnded { was_skipped: false })
    }
}
