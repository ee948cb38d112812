// demos/src/bin/interrupt_scenarios.rs
//
// This demo replays the journal interrupt scenarios against one factory and
// shows that none of them reaches the critical-error listener, while a
// genuine failure (opening a file in a missing directory) does.
//
// Scenarios demonstrated:
// - interrupted open
// - interrupted close after a synced write
// - interrupted write, write_direct, fill and read
// - a genuine open failure
//
// Run this demo with:
//   cargo run --bin interrupt_scenarios
//   (from the demos directory)

use bytes::{Buf, BufMut, Bytes, BytesMut};
use seqfile_rs::prelude::*;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use tracing::{info, warn};

struct EmptySlot;

impl EncodingSupport for EmptySlot {
    fn encode_size(&self) -> usize {
        10
    }

    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_bytes(0, 10);
    }

    fn decode(&mut self, buffer: &mut Bytes) {
        buffer.advance(10);
    }
}

type Scenario = fn(&SequentialFileFactory) -> seqfile_rs::sequential::Result<()>;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();
    info!("Interrupt Scenarios Demo");

    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            warn!("cannot create a scratch directory: {e}");
            return;
        }
    };

    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let listener: SharedErrorListener =
        Arc::new(move |cause: &io::Error, message: &str, file: &str| {
            warn!(file, ?cause, "broker would shut down: {message}");
            seen.fetch_add(1, Ordering::SeqCst);
        });
    let factory = Arc::new(SequentialFileFactory::with_listener(dir.path(), listener, 1));

    let scenarios: [(&str, Scenario); 6] = [
        ("open", interrupted_open),
        ("close", interrupted_close),
        ("write", interrupted_write),
        ("fill", interrupted_fill),
        ("write_direct", interrupted_write_direct),
        ("read", interrupted_read),
    ];

    for (name, scenario) in scenarios {
        let factory = Arc::clone(&factory);
        let result = thread::spawn(move || scenario(&factory)).join();
        match result {
            Ok(Ok(())) => info!(scenario = name, "completed"),
            Ok(Err(e)) => info!(
                scenario = name,
                interrupted = e.is_interrupted_abort(),
                "returned error: {e}"
            ),
            Err(_) => warn!(scenario = name, "scenario thread panicked"),
        }
    }
    info!(listener_calls = calls.load(Ordering::SeqCst), "after interrupt scenarios");

    // A genuine failure for contrast.
    let missing = SequentialFileFactory::with_listener(
        dir.path().join("missing"),
        Arc::clone(factory.listener()),
        1,
    );
    if let Err(e) = missing.create_sequential_file("file.txt").open() {
        info!(critical = e.is_critical(), "open in missing directory: {e}");
    }
    info!(listener_calls = calls.load(Ordering::SeqCst), "after genuine failure");
}

fn interrupted_open(factory: &SequentialFileFactory) -> seqfile_rs::sequential::Result<()> {
    interrupt_current();
    let mut file = factory.create_sequential_file("file.txt");
    file.open()
}

fn interrupted_close(factory: &SequentialFileFactory) -> seqfile_rs::sequential::Result<()> {
    let mut file = factory.create_sequential_file("file.txt");
    file.open()?;
    file.write(&EmptySlot, true)?;
    interrupt_current();
    file.close()
}

fn interrupted_write(factory: &SequentialFileFactory) -> seqfile_rs::sequential::Result<()> {
    let mut file = factory.create_sequential_file("file.txt");
    file.open()?;
    interrupt_current();
    let result = file.write(&EmptySlot, true);
    file.close()?;
    result
}

fn interrupted_fill(factory: &SequentialFileFactory) -> seqfile_rs::sequential::Result<()> {
    let mut file = factory.create_sequential_file("file.txt");
    file.open()?;
    interrupt_current();
    let result = file.fill(1024);
    file.close()?;
    result
}

fn interrupted_write_direct(factory: &SequentialFileFactory) -> seqfile_rs::sequential::Result<()> {
    let mut file = factory.create_sequential_file("file.txt");
    file.open()?;
    let buffer = [0u8; 10];
    interrupt_current();
    let result = file.write_direct(&buffer, true);
    file.close()?;
    result
}

fn interrupted_read(factory: &SequentialFileFactory) -> seqfile_rs::sequential::Result<()> {
    let mut file = factory.create_sequential_file("file.txt");
    file.open()?;
    file.write(&EmptySlot, true)?;
    file.set_position(0)?;
    let mut bytes = vec![0u8; EmptySlot.encode_size()];
    interrupt_current();
    let result = file.read(&mut bytes).map(|_| ());
    file.close()?;
    result
}
