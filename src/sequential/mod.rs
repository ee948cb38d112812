//! Interrupt-aware sequential files for durable journals.
//!
//! This module provides the per-file handle a journal writes through and
//! the factory that creates it.
//!
//! # Types
//!
//! - [`SequentialFileFactory`] — creates handles under one directory and
//!   owns the shared critical-error listener
//! - [`SequentialFile`] — one OS file with positioned read/write/fill
//! - [`EncodingSupport`] — fixed-size record serialization contract
//! - [`IoCriticalErrorListener`] — sink for genuine storage failures
//! - [`SequentialFileError`] — interrupt aborts, genuine failures, misuse
//! - [`InterruptHandle`] — the per-thread cooperative interrupt flag
//!
//! # Error Classification
//!
//! Every blocking OS call is classified by [`classify::run_blocking`]. An
//! interrupt raised by the calling thread before or during the call yields
//! [`SequentialFileError::InterruptedAbort`] and never reaches the
//! listener; any other OS error is reported to the listener exactly once.

pub mod classify;
pub mod config;
pub mod encoding;
pub mod error;
pub mod factory;
pub mod file;
pub mod interrupt;
pub mod listener;

pub use classify::{CallState, Outcome};
pub use config::{DEFAULT_ALIGNMENT, FactoryConfig};
pub use encoding::EncodingSupport;
pub use error::{Operation, Result, SequentialFileError};
pub use factory::SequentialFileFactory;
pub use file::SequentialFile;
pub use interrupt::{InterruptHandle, interrupt_current, interrupted, is_interrupted};
pub use listener::{IoCriticalErrorListener, LoggingErrorListener, SharedErrorListener};
