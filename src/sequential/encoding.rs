//! Fixed-size record encoding.
//!
//! Journal records are framed by their callers. A [`SequentialFile`]
//! only asks a record for its size and lets it serialize itself into a
//! buffer of exactly that size.
//!
//! [`SequentialFile`]: super::SequentialFile

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// A record that serializes to a fixed-length byte payload.
///
/// `encode` must append exactly [`encode_size`](EncodingSupport::encode_size)
/// bytes. A record that writes more or fewer is rejected by the file as a
/// caller bug, it is never treated as a storage failure.
pub trait EncodingSupport {
    /// Number of bytes [`encode`](EncodingSupport::encode) appends.
    fn encode_size(&self) -> usize;

    /// Append the serialized record to `buffer`.
    fn encode(&self, buffer: &mut BytesMut);

    /// Rebuild the record from `buffer`, which holds
    /// [`encode_size`](EncodingSupport::encode_size) bytes.
    fn decode(&mut self, buffer: &mut Bytes);
}

/// Raw bytes encode as themselves; decoding overwrites them in place.
impl EncodingSupport for Vec<u8> {
    fn encode_size(&self) -> usize {
        self.len()
    }

    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_slice(self);
    }

    fn decode(&mut self, buffer: &mut Bytes) {
        let len = self.len().min(buffer.remaining());
        buffer.copy_to_slice(&mut self[..len]);
    }
}
