//! Transition policy: should a finished phase advance on its own?

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::state::Phase;

/// Answers the presentation question the engine cannot answer itself
pub trait TransitionPolicy: Send {
    /// `true` to advance immediately, `false` to pause and ask the user
    fn should_auto_advance(&self, from: Phase) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum AlertMode {
    Disabled,
    #[default]
    Notify,
    FullScreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum NotifyStyle {
    /// Plain OS notifications, which cannot host choice buttons
    #[default]
    System,
    Small,
    Big,
}

/// Policy driven by the user's alert settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertPolicy {
    pub alert_mode: AlertMode,
    pub notify_style: NotifyStyle,
    /// Full-screen mode only: leave rest without asking
    pub auto_resume_work: bool,
}

impl TransitionPolicy for AlertPolicy {
    fn should_auto_advance(&self, from: Phase) -> bool {
        match self.alert_mode {
            AlertMode::Disabled => true,
            AlertMode::Notify => self.notify_style == NotifyStyle::System,
            AlertMode::FullScreen => from == Phase::Work || self.auto_resume_work,
        }
    }
}
