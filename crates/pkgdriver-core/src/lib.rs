//! pkgdriver-core: driving layer for an external package-manager CLI
//!
//! This crate owns the two hard parts of wrapping a command-line package
//! manager:
//! - Spawning the tool and capturing its stdout line-by-line, in both a
//!   blocking and a cancellable async mode (`executor`, `capture`).
//! - Turning the tool's inconsistent version strings into structured
//!   [`Version`] values without ever failing (`version`).
//!
//! Argument construction for the wrapped tool, exporting parsed results,
//! and interpreting exit codes all live one layer above this crate. A
//! non-zero exit code is returned as data, never as an error.

pub mod capture;
pub mod error;
pub mod executor;
pub mod line_buffer;
pub mod version;

// Re-export key types
pub use capture::{read_all_lines, read_all_lines_cancellable};
pub use error::{ExecError, Result};
pub use executor::{OsProcessExecutor, ProcessExecutor, ProcessResult, KILLED_EXIT_CODE};
pub use line_buffer::LineBuffer;
pub use version::{is_preview_release, Version};
