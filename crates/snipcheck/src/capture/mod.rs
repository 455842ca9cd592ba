//! Per-execution output capture
//!
//! Every execution gets its own child process whose stdout and stderr are
//! pipes owned by the capture scope. The host process's own streams are never
//! redirected, so concurrent executions cannot see each other's output.

use thiserror::Error;

pub use crate::capture::command::CaptureCommand;
pub use crate::capture::process::{CapturedOutput, run_captured};

mod command;
mod process;

/// Errors from the capture mechanism itself (never from the captured program)
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("empty command")]
    EmptyCommand,

    #[error("program '{0}' not found")]
    ProgramNotFound(String),

    #[error("failed to spawn '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while capturing output: {0}")]
    Io(#[from] std::io::Error),
}
