//! Engine collaborators module
//! 
//! This module contains the seams the timer engine talks through: the
//! transition policy, the focus-mode switch and the outbound signal sink.

pub mod focus;
pub mod notifier;
pub mod policy;

// Re-export main types
pub use focus::{CommandFocus, FocusMode, NoFocus};
pub use notifier::{BroadcastSink, SignalSink};
pub use policy::{AlertMode, AlertPolicy, NotifyStyle, TransitionPolicy};
