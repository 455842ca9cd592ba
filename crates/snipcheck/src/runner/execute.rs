//! Execution step for code running
//!
//! Builds the interpreter command for a submission, captures its output and
//! turns the exit status into an [`ExecutionOutcome`].

use std::io::ErrorKind;

use tracing::{debug, instrument, warn};

use crate::capture::{CaptureCommand, CaptureError, CapturedOutput, run_captured};
use crate::config::InterpreterConfig;
use crate::runner::ExecuteError;
use crate::types::ExecutionOutcome;

/// Run a submission as a standalone program
#[instrument(skip(interpreter, code), fields(interpreter = %interpreter.name, code_len = code.len()))]
pub async fn execute(
    interpreter: &InterpreterConfig,
    code: &str,
) -> Result<ExecutionOutcome, ExecuteError> {
    let command = build_command(interpreter, code);
    let captured = match run_captured(command).await {
        Ok(captured) => captured,
        Err(CaptureError::SpawnFailed { program, source })
            if interpreter.takes_source_argument() && is_rejected_argument(&source) =>
        {
            warn!(%program, error = %source, "submission rejected as a command-line argument");
            return Ok(ExecutionOutcome::failure(format!(
                "{program}: submission cannot be passed on the command line: {source}\n"
            )));
        }
        Err(e) => return Err(e.into()),
    };

    debug!(
        success = captured.success,
        exit_code = ?captured.exit_code,
        "execution complete"
    );

    Ok(classify(captured))
}

/// Build the capture command, passing the source inline or on stdin
fn build_command(interpreter: &InterpreterConfig, code: &str) -> CaptureCommand {
    let command = CaptureCommand::new(interpreter.expand_command(code))
        .envs(&interpreter.env)
        .path(interpreter.path.as_deref());

    if interpreter.takes_source_argument() {
        command
    } else {
        command.stdin(code)
    }
}

/// Spawn errors caused by the submission text rather than the interpreter
///
/// An argument may not contain NUL and is bounded in size by the OS.
fn is_rejected_argument(error: &std::io::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::InvalidInput | ErrorKind::ArgumentListTooLong
    )
}

/// Classify a finished child
///
/// Success keeps stdout only. Failure keeps whatever reached stdout before the
/// fault, followed by the interpreter's stderr trace.
fn classify(captured: CapturedOutput) -> ExecutionOutcome {
    if captured.success {
        return ExecutionOutcome::success(captured.stdout_text());
    }

    let mut trace = captured.stdout;
    trace.extend_from_slice(&captured.stderr);
    ExecutionOutcome::failure(String::from_utf8_lossy(&trace).into_owned())
}
