//! Spawning the wrapped tool and collecting its output.

use std::io::BufReader;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::capture::{read_all_lines, read_all_lines_cancellable};
use crate::error::{ExecError, Result};

/// Exit code reported when the process had to be forcibly terminated, or
/// when the OS gives no code (signal death).
pub const KILLED_EXIT_CODE: i32 = -1;

/// How long to wait for exit after stdout is drained, before killing.
const DEFAULT_EXIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one tool execution: the exit code plus stdout, line by line,
/// in emission order.
///
/// Reaching a `ProcessResult` at all means the process launched and ran; a
/// launch refused by the OS surfaces as [`ExecError::Launch`] instead. The
/// exit code is data for the caller to interpret, including the
/// [`KILLED_EXIT_CODE`] sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Exit code of the process.
    pub exit_code: i32,

    /// Captured stdout lines, in the order the process emitted them.
    pub lines: Vec<String>,
}

/// Execution seam for the wrapped tool.
///
/// Production code uses [`OsProcessExecutor`]; callers substitute test
/// doubles at this trait.
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Run the command to completion, blocking the calling thread.
    fn execute(&self, command_line: &str) -> Result<ProcessResult>;

    /// Run the command, checking `cancel` between output lines.
    ///
    /// Cancellation yields the lines captured so far as a normal result;
    /// the granularity is one whole line (see
    /// [`read_all_lines_cancellable`]). The child process is still reaped
    /// on that path.
    async fn execute_cancellable(
        &self,
        command_line: &str,
        cancel: &CancellationToken,
    ) -> Result<ProcessResult>;
}

/// Runs commands as real OS processes with piped stdout.
///
/// The command line is split on whitespace: first token is the program,
/// the rest are arguments. Quoting is not interpreted. Stderr is not
/// captured; a higher layer owns that if it is ever needed.
pub struct OsProcessExecutor {
    exit_timeout: Duration,
}

impl OsProcessExecutor {
    pub fn new() -> Self {
        Self {
            exit_timeout: DEFAULT_EXIT_TIMEOUT,
        }
    }

    /// Override how long to wait for exit after output is drained.
    pub fn with_exit_timeout(exit_timeout: Duration) -> Self {
        Self { exit_timeout }
    }

    /// Poll for exit until the timeout, then kill. Returns the exit code,
    /// with [`KILLED_EXIT_CODE`] standing in for a forced termination.
    fn wait_or_kill_blocking(&self, child: &mut std::process::Child) -> std::io::Result<i32> {
        let deadline = Instant::now() + self.exit_timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status.code().unwrap_or(KILLED_EXIT_CODE));
            }
            if Instant::now() >= deadline {
                warn!(timeout = ?self.exit_timeout, "process did not exit in time, killing");
                child.kill()?;
                child.wait()?;
                return Ok(KILLED_EXIT_CODE);
            }
            std::thread::sleep(Duration::from_millis(25));
        }
    }

    async fn wait_or_kill(&self, child: &mut tokio::process::Child) -> std::io::Result<i32> {
        match tokio::time::timeout(self.exit_timeout, child.wait()).await {
            Ok(status) => Ok(status?.code().unwrap_or(KILLED_EXIT_CODE)),
            Err(_) => {
                warn!(timeout = ?self.exit_timeout, "process did not exit in time, killing");
                child.kill().await?;
                Ok(KILLED_EXIT_CODE)
            }
        }
    }
}

impl Default for OsProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessExecutor for OsProcessExecutor {
    fn execute(&self, command_line: &str) -> Result<ProcessResult> {
        let (program, args) = split_command(command_line)?;
        debug!(command = command_line, "spawning process");

        let mut command = std::process::Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        apply_no_window(&mut command);

        let mut child = command.spawn().map_err(|source| ExecError::Launch {
            command: command_line.to_string(),
            source,
        })?;

        let lines = match child.stdout.take() {
            Some(stdout) => read_all_lines(BufReader::new(stdout)),
            None => Ok(Vec::new()),
        };

        // Reap the child even if reading failed, so no handle leaks.
        let exit_code = self.wait_or_kill_blocking(&mut child);
        let lines = lines?;
        let exit_code = exit_code?;

        debug!(exit_code, captured = lines.len(), "process finished");
        Ok(ProcessResult { exit_code, lines })
    }

    async fn execute_cancellable(
        &self,
        command_line: &str,
        cancel: &CancellationToken,
    ) -> Result<ProcessResult> {
        let (program, args) = split_command(command_line)?;
        debug!(command = command_line, "spawning cancellable process");

        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        apply_no_window_tokio(&mut command);

        let mut child = command.spawn().map_err(|source| ExecError::Launch {
            command: command_line.to_string(),
            source,
        })?;

        let lines = match child.stdout.take() {
            Some(stdout) => {
                read_all_lines_cancellable(tokio::io::BufReader::new(stdout), cancel).await
            }
            None => Ok(Vec::new()),
        };

        // On the cancelled path the child may still be running; wait out
        // the exit timeout and kill it if it lingers.
        let exit_code = self.wait_or_kill(&mut child).await;
        let lines = lines?;
        let exit_code = exit_code?;

        debug!(exit_code, captured = lines.len(), "process finished");
        Ok(ProcessResult { exit_code, lines })
    }
}

/// Split a command line into program and arguments on whitespace.
fn split_command(command_line: &str) -> Result<(String, Vec<String>)> {
    let mut tokens = command_line.split_whitespace().map(str::to_string);
    let program = tokens.next().ok_or(ExecError::EmptyCommand)?;
    Ok((program, tokens.collect()))
}

#[cfg(windows)]
fn apply_no_window(command: &mut std::process::Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn apply_no_window(_command: &mut std::process::Command) {}

#[cfg(windows)]
fn apply_no_window_tokio(command: &mut tokio::process::Command) {
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn apply_no_window_tokio(_command: &mut tokio::process::Command) {}
