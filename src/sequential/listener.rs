//! Critical I/O error reporting.
//!
//! A broker decides whether to shut down based solely on what reaches its
//! [`IoCriticalErrorListener`]. Handles report genuine storage failures here
//! exactly once and never report interrupt aborts.

use std::io;
use std::sync::Arc;
use tracing::error;

/// Sink for genuine, non-interrupt I/O failures.
///
/// One listener is shared by a factory and every handle it creates, so
/// implementations must tolerate concurrent and reentrant calls.
pub trait IoCriticalErrorListener: Send + Sync {
    /// Called once per genuine failure with the OS error, a human-readable
    /// message and the name of the affected file.
    fn on_io_exception(&self, cause: &io::Error, message: &str, file_name: &str);
}

impl<F> IoCriticalErrorListener for F
where
    F: Fn(&io::Error, &str, &str) + Send + Sync,
{
    fn on_io_exception(&self, cause: &io::Error, message: &str, file_name: &str) {
        self(cause, message, file_name)
    }
}

/// Shared listener reference held by a factory and its handles.
pub type SharedErrorListener = Arc<dyn IoCriticalErrorListener>;

/// Listener used when none is supplied: logs the failure and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingErrorListener;

impl IoCriticalErrorListener for LoggingErrorListener {
    fn on_io_exception(&self, cause: &io::Error, message: &str, file_name: &str) {
        error!(
            file = file_name,
            kind = ?cause.kind(),
            "critical I/O error: {message}"
        );
    }
}
