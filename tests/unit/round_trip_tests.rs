//! Data written through a handle reads back byte for byte.

use crate::common::{FakeEncoding, harness};
use proptest::prelude::*;
use seqfile_rs::prelude::*;

#[test]
fn encoded_record_reads_back() {
    let h = harness();
    let record = FakeEncoding::with_bytes(*b"0123456789");

    let mut file = h.factory.create_sequential_file("file.txt");
    file.open().expect("open");
    file.write(&record, true).expect("write");
    assert_eq!(file.position().ok(), Some(10));

    file.set_position(0).expect("position");
    let mut bytes = vec![0u8; record.encode_size()];
    assert_eq!(file.read(&mut bytes).ok(), Some(10));
    assert_eq!(bytes, record.bytes.to_vec());

    file.set_position(0).expect("position");
    let mut decoded = FakeEncoding::default();
    assert_eq!(file.read_encoding(&mut decoded).ok(), Some(true));
    assert_eq!(decoded, record);

    file.close().expect("close");
    assert_eq!(h.calls(), 0);
}

#[test]
fn data_survives_close_and_reopen() {
    let h = harness();

    let mut file = h.factory.create_sequential_file("file.txt");
    file.open().expect("open");
    file.write_direct(b"first", false).expect("write");
    file.write_direct(b"second", false).expect("write");
    file.close().expect("close");

    let mut file = h.factory.create_sequential_file("file.txt");
    file.open().expect("open");
    let mut buf = [0u8; 32];
    let read = file.read(&mut buf).expect("read");
    assert_eq!(&buf[..read], b"firstsecond");
    file.close().expect("close");
}

#[test]
fn fill_then_overwrite_in_place() {
    let h = harness();

    let mut file = h.factory.create_sequential_file("file.txt");
    file.open().expect("open");
    file.fill(4096).expect("fill");
    file.set_position(100).expect("position");
    file.write(&FakeEncoding::with_bytes([0xAB; 10]), true)
        .expect("write");
    assert_eq!(file.size().ok(), Some(4096));

    file.set_position(95).expect("position");
    let mut buf = [0xFFu8; 20];
    assert_eq!(file.read(&mut buf).ok(), Some(20));
    assert_eq!(&buf[..5], &[0u8; 5]);
    assert_eq!(&buf[5..15], &[0xAB; 10]);
    assert_eq!(&buf[15..], &[0u8; 5]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn records_read_back_in_order(
        records in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..64), 1..16)
    ) {
        let h = harness();
        let mut file = h.factory.create_sequential_file("prop.bin");
        file.open().expect("open");
        for record in &records {
            file.write(record, false).expect("write");
        }
        file.sync().expect("sync");

        file.set_position(0).expect("position");
        for record in &records {
            let mut decoded = vec![0u8; record.len()];
            prop_assert!(file.read_encoding(&mut decoded).expect("read"));
            prop_assert_eq!(&decoded, record);
        }

        let mut tail = [0u8; 1];
        prop_assert_eq!(file.read(&mut tail).ok(), Some(0));
        file.close().expect("close");
        prop_assert_eq!(h.calls(), 0);
    }
}
