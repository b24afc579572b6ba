//! Focus-mode (do not disturb) collaborator

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::FocusError;

/// Turns the OS focus mode on and off.
///
/// Calls must not block: implementations hand long-running work to the
/// runtime and only report failures they can detect up front.
pub trait FocusMode: Send {
    fn set_focus(&mut self, on: bool) -> Result<(), FocusError>;
}

/// No focus integration available. Turning focus on fails, turning it off is a no-op.
#[derive(Debug, Default)]
pub struct NoFocus;

impl FocusMode for NoFocus {
    fn set_focus(&mut self, on: bool) -> Result<(), FocusError> {
        if on {
            Err(FocusError::Unavailable)
        } else {
            Ok(())
        }
    }
}

/// Toggles focus mode by running user-configured shell commands
#[derive(Debug)]
pub struct CommandFocus {
    on_command: String,
    off_command: String,
    current: bool,
}

impl CommandFocus {
    pub fn new(on_command: String, off_command: String) -> Self {
        Self {
            on_command,
            off_command,
            current: false,
        }
    }

    fn spawn(command: &str) -> Result<(), FocusError> {
        let mut child = Command::new("sh")
            .args(["-c", command])
            .spawn()
            .map_err(|source| FocusError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let command = command.to_string();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => debug!("Focus command `{}` finished", command),
                Ok(status) => warn!("Focus command `{}` exited with {}", command, status),
                Err(e) => warn!("Failed to wait for focus command `{}`: {}", command, e),
            }
        });
        Ok(())
    }
}

impl FocusMode for CommandFocus {
    fn set_focus(&mut self, on: bool) -> Result<(), FocusError> {
        if self.current == on {
            return Ok(());
        }

        let command = if on { &self.on_command } else { &self.off_command };
        if command.trim().is_empty() {
            if on {
                return Err(FocusError::Unavailable);
            }
            self.current = false;
            return Ok(());
        }

        Self::spawn(command)?;
        info!("Focus mode {}", if on { "on" } else { "off" });
        self.current = on;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_focus_fails_only_when_enabling() {
        let mut focus = NoFocus;
        assert!(matches!(focus.set_focus(true), Err(FocusError::Unavailable)));
        assert!(focus.set_focus(false).is_ok());
    }

    #[tokio::test]
    async fn command_focus_skips_redundant_requests() {
        let mut focus = CommandFocus::new("true".to_string(), String::new());
        assert!(focus.set_focus(false).is_ok());
        assert!(focus.set_focus(true).is_ok());
        assert!(focus.set_focus(true).is_ok());
        // empty off command is a no-op but still allowed
        assert!(focus.set_focus(false).is_ok());
    }

    #[tokio::test]
    async fn command_focus_without_on_command_is_unavailable() {
        let mut focus = CommandFocus::new("  ".to_string(), "true".to_string());
        assert!(matches!(focus.set_focus(true), Err(FocusError::Unavailable)));
    }
}
