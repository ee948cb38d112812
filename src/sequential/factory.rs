/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Creation of [`SequentialFile`] handles.
//!
//! A [`SequentialFileFactory`] owns the directory, alignment and durability
//! settings and the one critical-error listener every handle it creates
//! reports to. It keeps no per-file state: creating the same name twice
//! yields two independent handles, and coordinating access to one path is
//! left to the caller.

use super::classify::{Outcome, escalate, interrupt_abort, run_blocking};
use super::config::FactoryConfig;
use super::error::{Operation, Result};
use super::file::SequentialFile;
use super::listener::{LoggingErrorListener, SharedErrorListener};
use bytes::BytesMut;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Factory for [`SequentialFile`] handles under one base directory.
///
/// # Thread Safety
///
/// The factory is `Send + Sync` and takes no locks; share it behind an
/// `Arc` and call [`create_sequential_file`](Self::create_sequential_file)
/// from any thread.
#[derive(Clone)]
pub struct SequentialFileFactory {
    directory: PathBuf,
    alignment: usize,
    datasync: bool,
    listener: SharedErrorListener,
}

impl SequentialFileFactory {
    /// Factory reporting critical errors to a [`LoggingErrorListener`].
    pub fn new(directory: impl Into<PathBuf>, alignment: usize) -> Self {
        Self::with_listener(directory, Arc::new(LoggingErrorListener), alignment)
    }

    /// Factory reporting critical errors to `listener`.
    ///
    /// An alignment of 0 is raised to 1.
    pub fn with_listener(
        directory: impl Into<PathBuf>,
        listener: SharedErrorListener,
        alignment: usize,
    ) -> Self {
        let directory = directory.into();
        if alignment == 0 {
            warn!(directory = %directory.display(), "alignment 0 requested, using 1");
        }
        Self {
            directory,
            alignment: alignment.max(1),
            datasync: true,
            listener,
        }
    }

    /// Factory built from a validated [`FactoryConfig`]. Without an explicit
    /// listener a [`LoggingErrorListener`] is used.
    ///
    /// # Errors
    ///
    /// [`SequentialFileError::InvalidConfig`](super::SequentialFileError::InvalidConfig)
    /// if the configuration does not validate.
    pub fn from_config(
        config: FactoryConfig,
        listener: Option<SharedErrorListener>,
    ) -> Result<Self> {
        config.validate()?;
        let listener = listener.unwrap_or_else(|| Arc::new(LoggingErrorListener));
        Ok(Self {
            directory: config.directory,
            alignment: config.alignment,
            datasync: config.datasync,
            listener,
        })
    }

    /// Toggle `sync_data` (default) versus `sync_all` for files created
    /// from now on.
    #[must_use]
    pub fn with_datasync(mut self, datasync: bool) -> Self {
        self.datasync = datasync;
        self
    }

    /// New unopened handle bound to `<directory>/<name>` and wired to the
    /// shared listener. The file is created by
    /// [`SequentialFile::open`].
    #[must_use]
    pub fn create_sequential_file(&self, name: &str) -> SequentialFile {
        SequentialFile::new(
            &self.directory,
            name,
            self.alignment,
            self.datasync,
            Arc::clone(&self.listener),
        )
    }

    /// The base directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Buffer alignment in bytes.
    #[must_use]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Whether forced writes use `sync_data`.
    #[must_use]
    pub fn is_datasync(&self) -> bool {
        self.datasync
    }

    /// The listener shared by every handle.
    #[must_use]
    pub fn listener(&self) -> &SharedErrorListener {
        &self.listener
    }

    /// Forward a failure detected outside a handle to the listener.
    pub fn on_io_error(&self, cause: &io::Error, message: &str, file_name: &str) {
        self.listener.on_io_exception(cause, message, file_name);
    }

    /// Create the base directory and any missing parents.
    ///
    /// # Errors
    ///
    /// Interrupt aborts, or genuine failures reported to the listener.
    pub fn create_dirs(&self) -> Result<()> {
        let name = self.directory_name();
        let outcome = run_blocking(Operation::CreateDirs, &name, || {
            fs::create_dir_all(&self.directory)
        });
        self.settle(Operation::CreateDirs, &name, outcome)?;
        debug!(directory = %name, "journal directory ready");
        Ok(())
    }

    /// Names of the regular files in the directory ending in
    /// `.{extension}`, sorted.
    ///
    /// # Errors
    ///
    /// Interrupt aborts, or genuine failures reported to the listener.
    pub fn list_files(&self, extension: &str) -> Result<Vec<String>> {
        let name = self.directory_name();
        let suffix = format!(".{extension}");
        let outcome = run_blocking(Operation::ListFiles, &name, || {
            let mut names = Vec::new();
            for entry in fs::read_dir(&self.directory)? {
                let entry = entry?;
                if !entry.file_type()?.is_file() {
                    continue;
                }
                let file_name = entry.file_name();
                if let Some(file_name) = file_name.to_str()
                    && file_name.ends_with(&suffix)
                {
                    names.push(file_name.to_string());
                }
            }
            names.sort();
            Ok(names)
        });
        self.settle(Operation::ListFiles, &name, outcome)
    }

    /// `bytes` rounded up to a multiple of the alignment.
    #[must_use]
    pub fn calculate_block_size(&self, bytes: usize) -> usize {
        bytes.div_ceil(self.alignment).saturating_mul(self.alignment)
    }

    /// A zeroed buffer of at least `size` bytes, rounded up to the
    /// alignment.
    #[must_use]
    pub fn new_buffer(&self, size: usize) -> BytesMut {
        BytesMut::zeroed(self.calculate_block_size(size))
    }

    fn directory_name(&self) -> String {
        self.directory.display().to_string()
    }

    fn settle<T>(&self, operation: Operation, name: &str, outcome: Outcome<T>) -> Result<T> {
        match outcome {
            Outcome::Completed(value) => Ok(value),
            Outcome::AbortedByInterrupt => Err(interrupt_abort(operation, name)),
            Outcome::FailedIo(e) => Err(escalate(&*self.listener, operation, name, e)),
        }
    }
}

impl std::fmt::Debug for SequentialFileFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialFileFactory")
            .field("directory", &self.directory)
            .field("alignment", &self.alignment)
            .field("datasync", &self.datasync)
            .finish()
    }
}
