//! Error types for extraction operations.
//!
//! Every failure mode in the extraction engine maps to one variant of
//! [`Error`]. Errors always propagate to the caller of the parser entry
//! point; nothing in the core recovers or suppresses them. The CLI layer
//! wraps these in `anyhow` for user-facing reporting.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A path that should be a readable directory is missing, not a
    /// directory, or cannot be read.
    #[error("unable to access directory {path}: {reason}")]
    DirectoryAccess { path: PathBuf, reason: String },

    /// The running-instance environment cannot be determined (for example,
    /// no version string is available).
    #[error("unable to determine the running instance environment: {0}")]
    Environment(String),

    /// A parser entry point was invoked that the parser does not support.
    #[error("parser \"{parser}\" does not support {operation}")]
    UnsupportedOperation {
        parser: &'static str,
        operation: &'static str,
    },

    /// The external extraction tool could not be run, exited with a
    /// non-zero status, or produced output that could not be parsed.
    /// Carries the tool's captured diagnostics.
    #[error("xgettext failed: {output}")]
    ExtractionTool { output: String },

    /// A temporary file required by the external tool could not be
    /// created or written.
    #[error("unable to create a temporary file: {0}")]
    TemporaryResource(#[source] std::io::Error),

    /// A gettext template file did not follow the PO syntax.
    #[error("invalid catalog syntax at line {line}: {message}")]
    CatalogSyntax { line: usize, message: String },
}

impl Error {
    pub(crate) fn directory_access(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Error::DirectoryAccess {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Error::DirectoryAccess {
            path: path.into(),
            reason: "not a directory".to_string(),
        }
    }
}
