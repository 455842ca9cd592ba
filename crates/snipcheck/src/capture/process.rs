//! Process spawning and output draining

use std::io::ErrorKind;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};
use tracing::{debug, instrument};

use crate::capture::CaptureError;
use crate::capture::command::CaptureCommand;

/// Everything a child wrote, plus how it exited
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Exit code, `None` if the child was killed by a signal
    pub exit_code: Option<i32>,
    /// Whether the child exited with status 0
    pub success: bool,
}

impl CapturedOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Run a command to completion and capture its stdout and stderr
///
/// Both pipes are drained concurrently while stdin is fed, so a child that
/// fills one pipe cannot stall on the other. The child is killed if this
/// future is dropped before it exits.
#[instrument(skip(command), fields(program = command.program()))]
pub async fn run_captured(command: CaptureCommand) -> Result<CapturedOutput, CaptureError> {
    let program = command.program().ok_or(CaptureError::EmptyCommand)?;

    let mut child = Command::new(program)
        .args(command.args())
        .envs(command.env_vars())
        .stdin(if command.stdin_data().is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| match source.kind() {
            ErrorKind::NotFound => CaptureError::ProgramNotFound(program.to_owned()),
            _ => CaptureError::SpawnFailed {
                program: program.to_owned(),
                source,
            },
        })?;

    debug!(pid = child.id(), "spawned child");

    let stdin = child.stdin.take();
    let (fed, output) = tokio::join!(
        feed_stdin(stdin, command.stdin_data()),
        child.wait_with_output()
    );
    fed?;
    let output = output?;

    let captured = CapturedOutput {
        stdout: output.stdout,
        stderr: output.stderr,
        exit_code: output.status.code(),
        success: output.status.success(),
    };

    debug!(
        exit_code = ?captured.exit_code,
        stdout_len = captured.stdout.len(),
        stderr_len = captured.stderr.len(),
        "child exited"
    );

    Ok(captured)
}

/// Write stdin data and close the pipe
///
/// A child that exits without reading all of its input is not an error.
async fn feed_stdin(stdin: Option<ChildStdin>, data: Option<&[u8]>) -> Result<(), CaptureError> {
    let (Some(mut pipe), Some(data)) = (stdin, data) else {
        return Ok(());
    };

    match pipe.write_all(data).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::BrokenPipe => return Ok(()),
        Err(e) => return Err(e.into()),
    }

    match pipe.shutdown().await {
        Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e.into()),
        _ => Ok(()),
    }
}
