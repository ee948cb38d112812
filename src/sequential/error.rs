//! Error types for sequential journal files.
//!
//! [`SequentialFileError`] separates the three outcomes a caller has to
//! tell apart: a cancellation raised by the calling thread, a genuine
//! storage failure (also reported to the critical-error listener), and
//! misuse of the handle.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Convenience alias for results produced by this module.
pub type Result<T> = std::result::Result<T, SequentialFileError>;

/// The file operation during which an error was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Acquiring the OS handle.
    Open,
    /// Releasing the OS handle.
    Close,
    /// Writing an encoded record.
    Write,
    /// Writing a caller-supplied buffer.
    WriteDirect,
    /// Zero-filling a region.
    Fill,
    /// Reading into a buffer.
    Read,
    /// Moving the read/write cursor.
    Position,
    /// Forcing written data to storage.
    Sync,
    /// Querying the file length.
    Size,
    /// Removing the file.
    Delete,
    /// Renaming the file.
    Rename,
    /// Creating the base directory.
    CreateDirs,
    /// Listing the base directory.
    ListFiles,
}

impl Operation {
    /// Returns the lowercase name used in logs and metric labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Open => "open",
            Operation::Close => "close",
            Operation::Write => "write",
            Operation::WriteDirect => "write_direct",
            Operation::Fill => "fill",
            Operation::Read => "read",
            Operation::Position => "position",
            Operation::Sync => "sync",
            Operation::Size => "size",
            Operation::Delete => "delete",
            Operation::Rename => "rename",
            Operation::CreateDirs => "create_dirs",
            Operation::ListFiles => "list_files",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by [`SequentialFile`](super::SequentialFile) and
/// [`SequentialFileFactory`](super::SequentialFileFactory).
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum SequentialFileError {
    /// The calling thread's interrupt flag was raised before or during a
    /// blocking call. Never reported to the critical-error listener.
    #[error("{operation} on {file} aborted: calling thread was interrupted")]
    InterruptedAbort {
        /// The operation that was aborted.
        operation: Operation,
        /// The file name the handle is bound to.
        file: String,
    },

    /// The OS refused to open the file.
    #[error("failed to open {}: {source}", .path.display())]
    OpenFailure {
        /// Full path of the file.
        path: PathBuf,
        /// The OS error.
        #[source]
        source: Arc<io::Error>,
    },

    /// An OS-reported I/O error unrelated to cancellation.
    #[error("critical I/O error during {operation} on {file}: {source}")]
    GenuineIoFailure {
        /// The operation that failed.
        operation: Operation,
        /// The file name (or directory) involved.
        file: String,
        /// The OS error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The handle was used in a way its state does not allow.
    #[error("invalid state for {operation} on {file}: {message}")]
    InvalidState {
        /// The rejected operation.
        operation: Operation,
        /// The file name the handle is bound to.
        file: String,
        /// What was wrong.
        message: String,
    },

    /// Factory configuration was rejected.
    #[error("invalid sequential file configuration: {message}")]
    InvalidConfig {
        /// What was wrong.
        message: String,
    },
}

impl SequentialFileError {
    #[cold]
    pub(crate) fn interrupted(operation: Operation, file: &str) -> Self {
        SequentialFileError::InterruptedAbort {
            operation,
            file: file.to_string(),
        }
    }

    #[cold]
    pub(crate) fn invalid_state(
        operation: Operation,
        file: &str,
        message: impl Into<String>,
    ) -> Self {
        SequentialFileError::InvalidState {
            operation,
            file: file.to_string(),
            message: message.into(),
        }
    }

    /// Returns `true` for aborts caused by the calling thread's interrupt.
    #[must_use]
    pub fn is_interrupted_abort(&self) -> bool {
        matches!(self, SequentialFileError::InterruptedAbort { .. })
    }

    /// Returns `true` for failures that were escalated to the listener.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            SequentialFileError::OpenFailure { .. } | SequentialFileError::GenuineIoFailure { .. }
        )
    }

    /// Returns the operation the error was raised from, when known.
    #[must_use]
    pub fn operation(&self) -> Option<Operation> {
        match self {
            SequentialFileError::InterruptedAbort { operation, .. }
            | SequentialFileError::GenuineIoFailure { operation, .. }
            | SequentialFileError::InvalidState { operation, .. } => Some(*operation),
            SequentialFileError::OpenFailure { .. } => Some(Operation::Open),
            SequentialFileError::InvalidConfig { .. } => None,
        }
    }
}
