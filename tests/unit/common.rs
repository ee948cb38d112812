//! Shared fixtures: a factory wired to a counting listener, and a record
//! type with a fixed ten-byte encoding.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use seqfile_rs::prelude::*;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use tempfile::TempDir;

pub struct Harness {
    pub dir: TempDir,
    pub factory: Arc<SequentialFileFactory>,
    calls: Arc<AtomicUsize>,
}

impl Harness {
    /// Number of times the shared listener has been invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn harness() -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let (factory, calls) = counting_factory(dir.path());
    Harness {
        dir,
        factory: Arc::new(factory),
        calls,
    }
}

pub fn counting_factory(dir: &Path) -> (SequentialFileFactory, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let listener: SharedErrorListener =
        Arc::new(move |cause: &io::Error, message: &str, file: &str| {
            tracing::debug!(file, ?cause, "listener invoked: {message}");
            seen.fetch_add(1, Ordering::SeqCst);
        });
    (SequentialFileFactory::with_listener(dir, listener, 1), calls)
}

/// Run `f` on a fresh thread so interrupt flags never leak between tests.
pub fn on_thread<R, F>(f: F) -> R
where
    R: Send + 'static,
    F: FnOnce() -> R + Send + 'static,
{
    thread::spawn(f).join().expect("worker thread panicked")
}

/// Ten-byte record, zero-filled like an empty journal slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FakeEncoding {
    pub bytes: [u8; 10],
}

impl FakeEncoding {
    pub fn with_bytes(bytes: [u8; 10]) -> Self {
        Self { bytes }
    }
}

impl EncodingSupport for FakeEncoding {
    fn encode_size(&self) -> usize {
        10
    }

    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_slice(&self.bytes);
    }

    fn decode(&mut self, buffer: &mut Bytes) {
        buffer.copy_to_slice(&mut self.bytes);
    }
}
