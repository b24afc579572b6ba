//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

use crate::{
    engine::EngineOptions,
    services::{AlertMode, AlertPolicy, NotifyStyle},
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "tomato-timer")]
#[command(about = "A pomodoro interval timer driven over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "21025")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// JSON file holding up to four presets
    #[arg(long, value_name = "FILE")]
    pub presets: Option<PathBuf>,

    /// Index of the preset to start with
    #[arg(long, default_value = "0")]
    pub preset: usize,

    /// Seconds a phase may overrun its deadline before the session is stopped
    #[arg(long, default_value = "60")]
    pub overrun_limit: u64,

    /// How finished phases are announced
    #[arg(long, value_enum, default_value_t = AlertMode::Notify)]
    pub alert_mode: AlertMode,

    /// Notification window style when alerting with notifications
    #[arg(long, value_enum, default_value_t = NotifyStyle::System)]
    pub notify_style: NotifyStyle,

    /// Leave rests without asking, in full-screen alert mode
    #[arg(long)]
    pub auto_resume_work: bool,

    /// Shell command turning focus mode on during work
    #[arg(long, value_name = "CMD")]
    pub focus_on_command: Option<String>,

    /// Shell command turning focus mode off
    #[arg(long, value_name = "CMD")]
    pub focus_off_command: Option<String>,

    /// Start a session as soon as the server is up
    #[arg(long)]
    pub start_on_launch: bool,

    /// Replace the first preset with a few-second set for manual testing
    #[arg(long)]
    pub test_mode: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn alert_policy(&self) -> AlertPolicy {
        AlertPolicy {
            alert_mode: self.alert_mode,
            notify_style: self.notify_style,
            auto_resume_work: self.auto_resume_work,
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            overrun_limit_secs: -(self.overrun_limit as f64),
        }
    }
}
