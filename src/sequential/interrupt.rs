//! Cooperative per-thread interrupt flags.
//!
//! Rust threads carry no built-in cancellation signal, so every thread gets
//! a lazily created flag. A thread may raise its own flag with
//! [`interrupt_current`], or hand out an [`InterruptHandle`] so that another
//! thread can raise it while the owner is blocked in file I/O.
//!
//! The flag is never polled mid-buffer. Blocking calls on a
//! [`SequentialFile`](super::SequentialFile) inspect it immediately before
//! and after each OS call (see [`classify`](super::classify)).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

thread_local! {
    static CURRENT: InterruptHandle = InterruptHandle::default();
}

/// A shareable handle onto one thread's interrupt flag.
///
/// Cloning the handle shares the flag, it does not copy it.
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle {
    flag: Arc<AtomicBool>,
}

impl InterruptHandle {
    /// Returns the handle for the calling thread's flag.
    #[must_use]
    pub fn current() -> Self {
        CURRENT.with(Clone::clone)
    }

    /// Raises the flag.
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns whether the flag is raised without clearing it.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Lowers the flag, returning whether it was raised.
    pub fn clear(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

/// Raises the calling thread's interrupt flag.
pub fn interrupt_current() {
    CURRENT.with(InterruptHandle::interrupt);
}

/// Returns whether the calling thread's interrupt flag is raised.
#[must_use]
pub fn is_interrupted() -> bool {
    CURRENT.with(InterruptHandle::is_interrupted)
}

/// Tests and clears the calling thread's interrupt flag.
pub fn interrupted() -> bool {
    CURRENT.with(InterruptHandle::clear)
}
