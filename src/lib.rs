//! # Interrupt-Aware Sequential Journal Files
//!
//! A thin, per-file handle over operating-system file I/O for the journal
//! of a durable message broker. Handles are created by a factory that owns
//! the directory, the alignment and the one listener every handle reports
//! critical storage failures to.
//!
//! ## The Problem
//!
//! A journal must never miss a real I/O failure, yet must never escalate a
//! blocking call that was abandoned because the calling thread asked to be
//! cancelled. Escalating the latter would shut the broker down for no
//! reason. Every OS call made by a [`SequentialFile`] is therefore
//! classified into one of three outcomes:
//!
//! | Outcome | Returned to caller | Reported to listener |
//! |---------|--------------------|----------------------|
//! | Completed | `Ok` | no |
//! | Aborted by interrupt | [`SequentialFileError::InterruptedAbort`] | no |
//! | Genuine failure | [`SequentialFileError::GenuineIoFailure`] / `OpenFailure` | exactly once |
//!
//! Misuse (writing before `open`, negative positions, records that encode
//! to the wrong size) returns [`SequentialFileError::InvalidState`] and is
//! never reported.
//!
//! ## Interrupts
//!
//! Rust threads have no native interrupt, so each thread carries a
//! cooperative flag. A thread raises its own with
//! [`interrupt_current`], or shares an [`InterruptHandle`] so another
//! thread can raise it while it is blocked. The flag is checked immediately
//! before and after each OS call, never mid-buffer. An interrupt abort
//! releases the OS handle; the handle can be closed (a no-op) and reopened.
//!
//! ## Example
//!
//! ```rust,no_run
//! use seqfile_rs::prelude::*;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let listener: SharedErrorListener =
//!     Arc::new(|cause: &std::io::Error, message: &str, file: &str| {
//!         eprintln!("shutting down: {file}: {message} ({cause})");
//!     });
//! let factory = SequentialFileFactory::with_listener("/var/lib/broker/journal", listener, 1);
//! factory.create_dirs()?;
//!
//! let mut file = factory.create_sequential_file("journal-1.amq");
//! file.open()?;
//! file.write(&b"record-0001".to_vec(), true)?;
//! file.set_position(0)?;
//! let mut buf = [0u8; 11];
//! file.read(&mut buf)?;
//! file.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `metrics`: counts interrupt aborts and critical errors per operation
//!   through the `metrics` facade.

pub mod prelude;
pub mod sequential;

pub use sequential::{
    CallState, EncodingSupport, FactoryConfig, InterruptHandle, IoCriticalErrorListener,
    LoggingErrorListener, Operation, Outcome, SequentialFile, SequentialFileError,
    SequentialFileFactory, SharedErrorListener, interrupt_current, interrupted, is_interrupted,
};
