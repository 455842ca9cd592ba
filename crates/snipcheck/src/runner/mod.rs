//! Code runner for Snipcheck
//!
//! Runs submissions through the configured interpreter and classifies the
//! result as success (captured stdout) or failure (diagnostic trace).

use thiserror::Error;

pub use crate::runner::execute::execute;

mod execute;

use crate::capture::CaptureError;
use crate::config::InterpreterConfig;
use crate::types::ExecutionOutcome;

/// Errors that occur while trying to run a submission
///
/// Faults raised by the submitted code are never reported here; they become a
/// failed [`ExecutionOutcome`].
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
}

/// High-level runner for submissions
#[derive(Debug, Clone)]
pub struct Runner {
    interpreter: InterpreterConfig,
}

impl Runner {
    /// Create a new runner for the given interpreter
    pub fn new(interpreter: InterpreterConfig) -> Self {
        Self { interpreter }
    }

    /// Get the interpreter configuration
    pub fn interpreter(&self) -> &InterpreterConfig {
        &self.interpreter
    }

    /// File name the interpreter gives the submission in tracebacks
    pub fn source_marker(&self) -> &str {
        &self.interpreter.source_marker
    }

    /// Run a submission
    pub async fn execute(&self, code: &str) -> Result<ExecutionOutcome, ExecuteError> {
        execute::execute(&self.interpreter, code).await
    }
}
