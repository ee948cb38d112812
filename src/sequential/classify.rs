//! Classification of blocking OS calls.
//!
//! Every call that may block on the file system goes through
//! [`run_blocking`], which walks the small state machine
//!
//! ```text
//! Issued -> Blocked -> { Completed | AbortedByInterrupt | FailedIo }
//! ```
//!
//! A call is `AbortedByInterrupt` when the calling thread's interrupt flag
//! is raised before the call is issued, is raised while it is blocked, or
//! when the OS itself reports [`io::ErrorKind::Interrupted`]. Any other error
//! is `FailedIo`. There is no retry at this layer.
//!
//! The interrupt flag is left raised after an abort; callers that want to
//! keep using the thread clear it with
//! [`interrupted`](super::interrupt::interrupted).

use super::error::{Operation, SequentialFileError};
use super::interrupt;
use super::listener::IoCriticalErrorListener;
use std::io;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// States a blocking call moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// The call has been requested but not yet handed to the OS.
    Issued,
    /// The call is inside the OS.
    Blocked,
    /// The call returned normally.
    Completed,
    /// The call was abandoned because the calling thread was interrupted.
    AbortedByInterrupt,
    /// The OS reported an error unrelated to interruption.
    FailedIo,
}

impl CallState {
    /// Returns `true` for the three end states.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CallState::Completed | CallState::AbortedByInterrupt | CallState::FailedIo
        )
    }
}

/// Terminal result of a classified blocking call.
#[derive(Debug)]
pub enum Outcome<T> {
    /// Normal completion with the call's value.
    Completed(T),
    /// Aborted by the calling thread's interrupt.
    AbortedByInterrupt,
    /// Genuine I/O failure.
    FailedIo(io::Error),
}

impl<T> Outcome<T> {
    /// The terminal [`CallState`] this outcome corresponds to.
    #[must_use]
    pub fn state(&self) -> CallState {
        match self {
            Outcome::Completed(_) => CallState::Completed,
            Outcome::AbortedByInterrupt => CallState::AbortedByInterrupt,
            Outcome::FailedIo(_) => CallState::FailedIo,
        }
    }
}

/// Run `call` and classify how it ended.
///
/// The interrupt flag is checked right before the call (an interrupted
/// thread never reaches the OS) and right after it (an interrupt raised
/// while blocked discards the call's result, even a successful one).
pub fn run_blocking<T, F>(operation: Operation, file: &str, call: F) -> Outcome<T>
where
    F: FnOnce() -> io::Result<T>,
{
    let mut state = CallState::Issued;
    trace!(%operation, file, ?state, "blocking call");

    if interrupt::is_interrupted() {
        return Outcome::AbortedByInterrupt;
    }

    state = CallState::Blocked;
    trace!(%operation, file, ?state, "blocking call");
    let result = call();

    if interrupt::is_interrupted() {
        return Outcome::AbortedByInterrupt;
    }

    match result {
        Ok(value) => Outcome::Completed(value),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => Outcome::AbortedByInterrupt,
        Err(e) => Outcome::FailedIo(e),
    }
}

/// Build the error for an interrupt abort. The listener is not involved.
#[cold]
pub(crate) fn interrupt_abort(operation: Operation, file: &str) -> SequentialFileError {
    debug!(%operation, file, "I/O aborted by thread interrupt");

    #[cfg(feature = "metrics")]
    metrics::counter!("seqfile_interrupted_aborts_total", "operation" => operation.as_str())
        .increment(1);

    SequentialFileError::interrupted(operation, file)
}

/// Report a genuine failure to `listener` exactly once and build the error
/// returned to the caller.
#[cold]
pub(crate) fn escalate(
    listener: &dyn IoCriticalErrorListener,
    operation: Operation,
    file: &str,
    cause: io::Error,
) -> SequentialFileError {
    let cause = Arc::new(cause);
    notify(listener, operation, file, &cause);
    SequentialFileError::GenuineIoFailure {
        operation,
        file: file.to_string(),
        source: cause,
    }
}

/// Hand a genuine failure to the listener.
pub(crate) fn notify(
    listener: &dyn IoCriticalErrorListener,
    operation: Operation,
    file: &str,
    cause: &io::Error,
) {
    let message = format!("{operation} failed: {cause}");
    warn!(%operation, file, kind = ?cause.kind(), "reporting critical I/O error");

    #[cfg(feature = "metrics")]
    metrics::counter!("seqfile_critical_io_errors_total", "operation" => operation.as_str())
        .increment(1);

    listener.on_io_exception(cause, &message, file);
}
