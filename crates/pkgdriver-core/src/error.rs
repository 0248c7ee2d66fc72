//! Error types for pkgdriver-core

use thiserror::Error;

/// Errors that can occur while executing the wrapped tool.
///
/// A non-zero exit code from the tool is not an error; it is returned to the
/// caller as part of [`crate::ProcessResult`].
#[derive(Error, Debug)]
pub enum ExecError {
    /// The OS refused to start the process (bad path, permissions). No exit
    /// code or output exists in this case.
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command line contained no program name.
    #[error("empty command line")]
    EmptyCommand,

    /// I/O failure while reading output or reaping the process.
    #[error("process I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for executor operations.
pub type Result<T> = std::result::Result<T, ExecError>;
