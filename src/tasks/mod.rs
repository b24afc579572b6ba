//! Background tasks module
//! 
//! This module contains the engine's coordination task and the tokio
//! tick, debounce and logging tasks that run alongside the HTTP server.

pub mod coordinator;
pub mod debounce;
pub mod signal_log;
pub mod ticker;

// Re-export main types
pub use coordinator::{spawn_engine, Command, EngineHandle, EngineParts, PresetsView};
pub use signal_log::signal_logger_task;
