//! A single journal file backed by one OS handle.
//!
//! [`SequentialFile`] exposes positioned reads and writes with per-write
//! durability control. Every OS call is routed through
//! [`run_blocking`] so that an interrupt raised by the calling thread is
//! told apart from a genuine storage failure:
//!
//! - interrupt aborts release the OS handle and return
//!   [`SequentialFileError::InterruptedAbort`], the listener is untouched;
//! - genuine failures keep the handle, are reported to the shared
//!   [`IoCriticalErrorListener`] once, and return
//!   [`SequentialFileError::GenuineIoFailure`] (or `OpenFailure`).
//!
//! [`IoCriticalErrorListener`]: super::listener::IoCriticalErrorListener

use super::classify::{Outcome, escalate, interrupt_abort, notify, run_blocking};
use super::encoding::EncodingSupport;
use super::error::{Operation, Result, SequentialFileError};
use super::listener::SharedErrorListener;
use bytes::{Bytes, BytesMut};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Largest zero buffer allocated by [`SequentialFile::fill`].
const FILL_CHUNK: usize = 64 * 1024;

/// A handle onto one flat file under a factory's directory.
///
/// Created unopened by
/// [`SequentialFileFactory::create_sequential_file`](super::SequentialFileFactory::create_sequential_file).
/// The handle owns its descriptor and cursor exclusively; two handles on
/// the same path share nothing but the listener.
///
/// # Example
///
/// ```rust,no_run
/// use seqfile_rs::sequential::SequentialFileFactory;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let factory = SequentialFileFactory::new("/tmp/journal", 1);
/// let mut file = factory.create_sequential_file("journal-1.amq");
/// file.open()?;
/// file.write_direct(b"0123456789", true)?;
/// file.close()?;
/// # Ok(())
/// # }
/// ```
pub struct SequentialFile {
    directory: PathBuf,
    file_name: String,
    /// `None` while closed, including after an interrupt abort.
    file: Option<File>,
    position: u64,
    /// Set by unsynced writes; `close` forces them out.
    dirty: bool,
    alignment: usize,
    datasync: bool,
    listener: SharedErrorListener,
}

impl SequentialFile {
    pub(crate) fn new(
        directory: &Path,
        file_name: &str,
        alignment: usize,
        datasync: bool,
        listener: SharedErrorListener,
    ) -> Self {
        Self {
            directory: directory.to_path_buf(),
            file_name: file_name.to_string(),
            file: None,
            position: 0,
            dirty: false,
            alignment: alignment.max(1),
            datasync,
            listener,
        }
    }

    /// The file name relative to the factory directory.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The directory the file lives in.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Full path of the underlying file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    /// Whether the handle currently holds an OS descriptor.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Whether the file exists on disk.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Alignment inherited from the factory.
    #[must_use]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// The first aligned offset at or after `position`.
    #[must_use]
    pub fn calculate_block_start(&self, position: u64) -> u64 {
        let alignment = self.alignment as u64;
        position.div_ceil(alignment).saturating_mul(alignment)
    }

    /// Acquire the OS handle, creating the file if it does not exist.
    ///
    /// Opening an already open handle does nothing. The cursor starts at 0.
    ///
    /// An interrupt abort leaves the calling thread's interrupt flag raised,
    /// so reopening on that same thread aborts again until the flag is
    /// cleared with [`interrupted`](super::interrupt::interrupted). Another
    /// thread, or the same thread after clearing, reopens normally.
    ///
    /// # Errors
    ///
    /// - [`SequentialFileError::InterruptedAbort`] if the calling thread is
    ///   interrupted before or while opening.
    /// - [`SequentialFileError::OpenFailure`] if the OS refuses; reported
    ///   to the listener.
    pub fn open(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }

        let path = self.path();
        let outcome = run_blocking(Operation::Open, &self.file_name, || {
            OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&path)
        });

        match outcome {
            Outcome::Completed(file) => {
                self.file = Some(file);
                self.position = 0;
                self.dirty = false;
                debug!(file = %self.file_name, "opened sequential file");
                Ok(())
            }
            Outcome::AbortedByInterrupt => Err(interrupt_abort(Operation::Open, &self.file_name)),
            Outcome::FailedIo(e) => {
                let cause = Arc::new(e);
                notify(&*self.listener, Operation::Open, &self.file_name, &cause);
                Err(SequentialFileError::OpenFailure {
                    path,
                    source: cause,
                })
            }
        }
    }

    /// Release the OS handle.
    ///
    /// Closing a handle that is not open (never opened, failed to open,
    /// already closed, or released by an interrupt abort) is a no-op.
    /// Unsynced writes are forced to storage first unless the calling
    /// thread is interrupted, in which case that sync is skipped and the
    /// handle is still released.
    ///
    /// # Errors
    ///
    /// [`SequentialFileError::GenuineIoFailure`] if the final sync fails;
    /// the handle is released anyway.
    pub fn close(&mut self) -> Result<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        let dirty = std::mem::take(&mut self.dirty);
        self.position = 0;

        if !dirty {
            debug!(file = %self.file_name, "closed sequential file");
            return Ok(());
        }

        let datasync = self.datasync;
        match run_blocking(Operation::Close, &self.file_name, || force(&file, datasync)) {
            Outcome::Completed(()) => {
                debug!(file = %self.file_name, "closed sequential file");
                Ok(())
            }
            Outcome::AbortedByInterrupt => {
                debug!(file = %self.file_name, "thread interrupted, closed without final sync");
                Ok(())
            }
            Outcome::FailedIo(e) => {
                Err(escalate(&*self.listener, Operation::Close, &self.file_name, e))
            }
        }
    }

    /// Current read/write offset.
    ///
    /// # Errors
    ///
    /// [`SequentialFileError::InvalidState`] if the file is not open.
    pub fn position(&self) -> Result<u64> {
        if self.file.is_none() {
            return Err(not_open(&self.file_name, Operation::Position));
        }
        Ok(self.position)
    }

    /// Move the read/write offset. Positions past the end are allowed.
    ///
    /// # Errors
    ///
    /// [`SequentialFileError::InvalidState`] if the file is not open or
    /// `position` is negative.
    pub fn set_position(&mut self, position: i64) -> Result<()> {
        if self.file.is_none() {
            return Err(not_open(&self.file_name, Operation::Position));
        }
        let position = u64::try_from(position).map_err(|_| {
            SequentialFileError::invalid_state(
                Operation::Position,
                &self.file_name,
                format!("negative position {position}"),
            )
        })?;
        self.position = position;
        Ok(())
    }

    /// Encode `payload` and write it at the current position.
    ///
    /// The position advances by [`EncodingSupport::encode_size`]. With
    /// `sync` the data is durable when this returns.
    ///
    /// # Errors
    ///
    /// - [`SequentialFileError::InvalidState`] if the file is not open or
    ///   the payload encodes to a different size than it declares.
    /// - [`SequentialFileError::InterruptedAbort`] on thread interrupt.
    /// - [`SequentialFileError::GenuineIoFailure`] otherwise; reported.
    pub fn write<E>(&mut self, payload: &E, sync: bool) -> Result<()>
    where
        E: EncodingSupport + ?Sized,
    {
        if self.file.is_none() {
            return Err(not_open(&self.file_name, Operation::Write));
        }

        let size = payload.encode_size();
        let mut buffer = BytesMut::with_capacity(size);
        payload.encode(&mut buffer);
        if buffer.len() != size {
            return Err(SequentialFileError::invalid_state(
                Operation::Write,
                &self.file_name,
                format!("record declared {size} bytes but encoded {}", buffer.len()),
            ));
        }

        self.write_bytes(Operation::Write, &buffer, sync)
    }

    /// Write a caller-supplied buffer at the current position.
    ///
    /// # Errors
    ///
    /// Same as [`write`](Self::write), minus the encoding check.
    pub fn write_direct(&mut self, buffer: &[u8], sync: bool) -> Result<()> {
        self.write_bytes(Operation::WriteDirect, buffer, sync)
    }

    /// Zero-fill `size` bytes starting at the current position and force
    /// them to storage. The position is left unchanged, so later writes
    /// land inside the filled region.
    ///
    /// # Errors
    ///
    /// Same classification as [`write`](Self::write).
    pub fn fill(&mut self, size: usize) -> Result<()> {
        let position = self.position;
        let datasync = self.datasync;
        let Some(file) = self.file.as_mut() else {
            return Err(not_open(&self.file_name, Operation::Fill));
        };

        let outcome = run_blocking(Operation::Fill, &self.file_name, || {
            file.seek(SeekFrom::Start(position))?;
            let zeros = vec![0u8; size.min(FILL_CHUNK)];
            let mut remaining = size;
            while remaining > 0 {
                let n = remaining.min(zeros.len());
                file.write_all(&zeros[..n])?;
                remaining -= n;
            }
            force(file, datasync)
        });

        self.settle(Operation::Fill, outcome)?;
        self.dirty = false;
        trace!(file = %self.file_name, position, size, "filled");
        Ok(())
    }

    /// Read up to `buffer.len()` bytes from the current position.
    ///
    /// Returns the number of bytes read, which is smaller than the buffer
    /// only at end of file. The position advances by that amount.
    ///
    /// # Errors
    ///
    /// Same classification as [`write`](Self::write).
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let position = self.position;
        let Some(file) = self.file.as_mut() else {
            return Err(not_open(&self.file_name, Operation::Read));
        };

        let outcome = run_blocking(Operation::Read, &self.file_name, || {
            file.seek(SeekFrom::Start(position))?;
            read_up_to(file, buffer)
        });

        let read = self.settle(Operation::Read, outcome)?;
        self.position = self.position.saturating_add(read as u64);
        Ok(read)
    }

    /// Read one fixed-size record at the current position and decode it
    /// into `record`.
    ///
    /// Returns `false`, with the position unchanged, when the file ends
    /// before a whole record.
    ///
    /// # Errors
    ///
    /// Same classification as [`read`](Self::read).
    pub fn read_encoding<E>(&mut self, record: &mut E) -> Result<bool>
    where
        E: EncodingSupport + ?Sized,
    {
        let size = record.encode_size();
        let mut buffer = vec![0u8; size];
        let read = self.read(&mut buffer)?;
        if read < size {
            self.position = self.position.saturating_sub(read as u64);
            return Ok(false);
        }
        record.decode(&mut Bytes::from(buffer));
        Ok(true)
    }

    /// Force all written data to storage.
    ///
    /// # Errors
    ///
    /// Same classification as [`write`](Self::write).
    pub fn sync(&mut self) -> Result<()> {
        let datasync = self.datasync;
        let Some(file) = self.file.as_ref() else {
            return Err(not_open(&self.file_name, Operation::Sync));
        };

        let outcome = run_blocking(Operation::Sync, &self.file_name, || force(file, datasync));
        self.settle(Operation::Sync, outcome)?;
        self.dirty = false;
        Ok(())
    }

    /// Current length of the file in bytes. Works on closed handles; a
    /// file that does not exist yet has length 0.
    ///
    /// # Errors
    ///
    /// Interrupt aborts and genuine failures as for [`read`](Self::read).
    pub fn size(&mut self) -> Result<u64> {
        let path = self.path();
        let outcome = match self.file.as_ref() {
            Some(file) => run_blocking(Operation::Size, &self.file_name, || {
                file.metadata().map(|m| m.len())
            }),
            None => run_blocking(Operation::Size, &self.file_name, || {
                match fs::metadata(&path) {
                    Ok(metadata) => Ok(metadata.len()),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
                    Err(e) => Err(e),
                }
            }),
        };
        self.settle(Operation::Size, outcome)
    }

    /// Close the handle and remove the file. A missing file is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Errors from [`close`](Self::close), interrupt aborts, and genuine
    /// removal failures.
    pub fn delete(&mut self) -> Result<()> {
        self.close()?;

        let path = self.path();
        let outcome = run_blocking(Operation::Delete, &self.file_name, || {
            match fs::remove_file(&path) {
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                other => other,
            }
        });
        self.settle(Operation::Delete, outcome)?;
        debug!(file = %self.file_name, "deleted sequential file");
        Ok(())
    }

    /// Close the handle and rename the file within its directory. The
    /// handle is rebound to `new_name` and left closed.
    ///
    /// # Errors
    ///
    /// Errors from [`close`](Self::close), interrupt aborts, and genuine
    /// rename failures.
    pub fn rename_to(&mut self, new_name: &str) -> Result<()> {
        self.close()?;
        if new_name == self.file_name {
            return Ok(());
        }

        let from = self.path();
        let to = self.directory.join(new_name);
        let outcome = run_blocking(Operation::Rename, &self.file_name, || fs::rename(&from, &to));
        self.settle(Operation::Rename, outcome)?;

        debug!(from = %self.file_name, to = new_name, "renamed sequential file");
        self.file_name = new_name.to_string();
        Ok(())
    }

    /// A new, unopened handle on the same path sharing this handle's
    /// listener and settings.
    #[must_use]
    pub fn clone_file(&self) -> SequentialFile {
        SequentialFile::new(
            &self.directory,
            &self.file_name,
            self.alignment,
            self.datasync,
            Arc::clone(&self.listener),
        )
    }

    fn write_bytes(&mut self, operation: Operation, bytes: &[u8], sync: bool) -> Result<()> {
        let position = self.position;
        let datasync = self.datasync;
        let Some(file) = self.file.as_mut() else {
            return Err(not_open(&self.file_name, operation));
        };

        let outcome = run_blocking(operation, &self.file_name, || {
            file.seek(SeekFrom::Start(position))?;
            file.write_all(bytes)?;
            if sync {
                force(file, datasync)?;
            }
            Ok(())
        });

        self.settle(operation, outcome)?;
        self.position = position.saturating_add(bytes.len() as u64);
        self.dirty = !sync;
        trace!(file = %self.file_name, position, len = bytes.len(), sync, "wrote");
        Ok(())
    }

    /// Turn a classified outcome into the caller's result. Interrupt aborts
    /// release the OS handle; genuine failures are escalated.
    fn settle<T>(&mut self, operation: Operation, outcome: Outcome<T>) -> Result<T> {
        match outcome {
            Outcome::Completed(value) => Ok(value),
            Outcome::AbortedByInterrupt => {
                self.file = None;
                self.dirty = false;
                self.position = 0;
                Err(interrupt_abort(operation, &self.file_name))
            }
            Outcome::FailedIo(e) => Err(escalate(&*self.listener, operation, &self.file_name, e)),
        }
    }
}

#[cold]
fn not_open(file_name: &str, operation: Operation) -> SequentialFileError {
    SequentialFileError::invalid_state(operation, file_name, "file is not open")
}

/// Fill `buffer` from `reader` until it is full or the reader hits end of
/// file. Signal interruptions (`EINTR`) are retried; only the thread's own
/// interrupt flag may abort a read.
fn read_up_to<R: Read + ?Sized>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0usize;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn force(file: &File, datasync: bool) -> io::Result<()> {
    if datasync {
        file.sync_data()
    } else {
        file.sync_all()
    }
}

impl std::fmt::Debug for SequentialFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialFile")
            .field("path", &self.path())
            .field("open", &self.file.is_some())
            .field("position", &self.position)
            .field("alignment", &self.alignment)
            .field("datasync", &self.datasync)
            .finish()
    }
}
