//! Counter coverage for the `metrics` feature. Every test installs its own
//! thread-local debugging recorder, so tests never observe each other.


use metrics::{SharedString, Unit};
use metrics_util::CompositeKey;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use seqfile_rs::prelude::*;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const ABORTS: &str = "seqfile_interrupted_aborts_total";
pub const CRITICAL: &str = "seqfile_critical_io_errors_total";

pub type Entry = (CompositeKey, Option<Unit>, Option<SharedString>, DebugValue);

/// Run `f` against a fresh recorder and return what it recorded.
pub fn record<R>(f: impl FnOnce() -> R) -> (R, Vec<Entry>) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let result = metrics::with_local_recorder(&recorder, f);
    (result, snapshotter.snapshot().into_vec())
}

/// Value of counter `name` labelled with `operation`, 0 if never touched.
pub fn counter(entries: &[Entry], name: &str, operation: &str) -> u64 {
    entries
        .iter()
        .filter(|(key, ..)| {
            key.key().name() == name
                && key
                    .key()
                    .labels()
                    .any(|label| label.key() == "operation" && label.value() == operation)
        })
        .map(|(.., value)| match value {
            DebugValue::Counter(n) => *n,
            _ => 0,
        })
        .sum()
}

/// Sum of counter `name` across every operation label.
pub fn total(entries: &[Entry], name: &str) -> u64 {
    entries
        .iter()
        .filter(|(key, ..)| key.key().name() == name)
        .map(|(.., value)| match value {
            DebugValue::Counter(n) => *n,
            _ => 0,
        })
        .sum()
}

pub fn counting_factory(dir: &Path) -> (SequentialFileFactory, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let listener: SharedErrorListener = Arc::new(move |_: &io::Error, _: &str, _: &str| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    (SequentialFileFactory::with_listener(dir, listener, 1), calls)
}
