//! End-to-end executor tests against real child processes.
//!
//! Each test writes a small shell script to a temp directory and runs it
//! through the executor, so the pipe plumbing, exit handling, and
//! cancellation paths are exercised for real.

#![cfg(unix)]

use std::path::PathBuf;
use std::time::Duration;

use pkgdriver_core::{ExecError, OsProcessExecutor, ProcessExecutor, KILLED_EXIT_CODE};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn write_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).expect("write script");
    path
}

#[test]
fn test_empty_line_in_output_is_preserved() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let script = write_script(&dir, "emit.sh", "echo a\necho\necho c\n");

    let executor = OsProcessExecutor::new();
    let result = executor.execute(&format!("sh {}", script.display()))?;

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.lines, vec!["a", "", "c"]);
    Ok(())
}

#[test]
fn test_nonzero_exit_code_is_data_not_error() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let script = write_script(&dir, "fail.sh", "echo partial\nexit 3\n");

    let executor = OsProcessExecutor::new();
    let result = executor.execute(&format!("sh {}", script.display()))?;

    assert_eq!(result.exit_code, 3);
    assert_eq!(result.lines, vec!["partial"]);
    Ok(())
}

#[test]
fn test_launch_failure_reports_no_exit_code() {
    let executor = OsProcessExecutor::new();
    let err = executor
        .execute("/nonexistent/pkgdriver-tool --version")
        .unwrap_err();
    assert!(matches!(err, ExecError::Launch { .. }));
}

#[test]
fn test_lingering_process_is_killed_after_output_drained() -> anyhow::Result<()> {
    // The script closes its stdout so the reader sees end-of-stream, then
    // hangs. The executor must kill it once the exit timeout elapses and
    // still return the output captured before the hang.
    let dir = TempDir::new()?;
    let script = write_script(
        &dir,
        "hang.sh",
        "echo started\nexec >/dev/null 2>&1\nsleep 30\n",
    );

    let executor = OsProcessExecutor::with_exit_timeout(Duration::from_millis(300));
    let result = executor.execute(&format!("sh {}", script.display()))?;

    assert_eq!(result.exit_code, KILLED_EXIT_CODE);
    assert_eq!(result.lines, vec!["started"]);
    Ok(())
}

#[tokio::test]
async fn test_cancellable_run_to_completion() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let script = write_script(&dir, "emit.sh", "echo a\necho\necho c\n");

    let executor = OsProcessExecutor::new();
    let cancel = CancellationToken::new();
    let result = executor
        .execute_cancellable(&format!("sh {}", script.display()), &cancel)
        .await?;

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.lines, vec!["a", "", "c"]);
    Ok(())
}

#[tokio::test]
async fn test_cancellation_yields_ordered_prefix() -> anyhow::Result<()> {
    // Cancellation is checked between lines, not mid-read, so the exact
    // number of captured lines depends on subprocess timing. The contract
    // is only: no error, and the captured lines are an ordered prefix of
    // the full output.
    let dir = TempDir::new()?;
    let script = write_script(
        &dir,
        "slow.sh",
        "echo one\nsleep 2\necho two\necho three\n",
    );

    let executor = OsProcessExecutor::with_exit_timeout(Duration::from_millis(300));
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        canceller.cancel();
    });

    let result = executor
        .execute_cancellable(&format!("sh {}", script.display()), &cancel)
        .await?;

    let full = ["one", "two", "three"];
    assert!(!result.lines.is_empty());
    assert!(result.lines.len() <= full.len());
    assert_eq!(result.lines, &full[..result.lines.len()]);
    Ok(())
}
