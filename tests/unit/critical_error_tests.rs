//! Genuine storage failures are reported to the listener exactly once.

use crate::common::{FakeEncoding, counting_factory, harness, on_thread};
use seqfile_rs::prelude::*;
use std::path::Path;
use std::sync::Arc;

#[test]
fn open_in_missing_directory_is_reported_once() {
    let h = harness();
    let (factory, calls) = counting_factory(&h.dir.path().join("missing"));
    let mut file = factory.create_sequential_file("file.txt");

    let open = file.open();
    assert!(matches!(open, Err(SequentialFileError::OpenFailure { .. })));
    assert!(open.is_err_and(|e| e.is_critical()));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);

    // Closing a handle that never opened is silent.
    assert!(file.close().is_ok());
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn interrupted_open_in_missing_directory_is_not_reported() {
    let h = harness();
    let (factory, calls) = counting_factory(&h.dir.path().join("missing"));

    let open = on_thread(move || {
        interrupt_current();
        factory.create_sequential_file("file.txt").open()
    });

    assert!(open.is_err_and(|e| e.is_interrupted_abort()));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[test]
fn misuse_is_never_reported() {
    let h = harness();
    let mut file = h.factory.create_sequential_file("file.txt");

    assert!(file.write(&FakeEncoding::default(), true).is_err());
    assert!(file.open().is_ok());
    assert!(file.set_position(-10).is_err());
    assert_eq!(h.calls(), 0);
}

#[test]
fn concurrent_failures_are_each_reported() {
    let h = harness();
    let (factory, calls) = counting_factory(&h.dir.path().join("missing"));
    let factory = Arc::new(factory);

    let workers: Vec<_> = (0..16)
        .map(|i| {
            let factory = Arc::clone(&factory);
            std::thread::spawn(move || {
                let mut file = factory.create_sequential_file(&format!("file-{i}.txt"));
                file.open().is_err()
            })
        })
        .collect();

    for worker in workers {
        assert!(worker.join().expect("worker"));
    }
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 16);
}

#[cfg(target_os = "linux")]
#[test]
fn write_to_full_device_is_reported_once() {
    let dev = Path::new("/dev");
    if !dev.join("full").exists() {
        return;
    }
    let (factory, calls) = counting_factory(dev);
    let mut file = factory.create_sequential_file("full");
    if file.open().is_err() {
        return;
    }

    let write = file.write(&FakeEncoding::default(), true);
    assert!(matches!(
        write,
        Err(SequentialFileError::GenuineIoFailure {
            operation: Operation::Write,
            ..
        })
    ));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);

    // A genuine failure keeps the handle; closing it is still safe.
    assert!(file.is_open());
    assert!(file.close().is_ok());
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[cfg(target_os = "linux")]
#[test]
fn interrupted_write_to_full_device_is_not_reported() {
    let dev = Path::new("/dev");
    if !dev.join("full").exists() {
        return;
    }
    let (factory, calls) = counting_factory(dev);

    let write = on_thread(move || {
        let mut file = factory.create_sequential_file("full");
        if file.open().is_err() {
            return None;
        }
        interrupt_current();
        Some(file.write_direct(&[0u8; 10], true))
    });

    if let Some(write) = write {
        assert!(write.is_err_and(|e| e.is_interrupted_abort()));
    }
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}
