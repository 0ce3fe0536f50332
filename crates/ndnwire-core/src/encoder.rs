//! Two-pass TLV encoding.
//!
//! TLV lengths prefix their values, so a naive front-to-back writer either
//! guesses the length field size or moves bytes around afterwards. Encoding
//! here runs the same routine twice against the [`Encoder`] capability:
//!
//! 1. [`Estimator`] only counts bytes and produces the exact output size.
//! 2. [`EncodingBuffer`] is allocated to that size and filled back to front.
//!    Children are prepended first, so every parent already knows its value
//!    length when its Type/Length prefix is written.
//!
//! Types that encode this way implement [`TlvEncode`].

use bytes::Bytes;

use crate::block::Block;
use crate::error::Result;
use crate::varnum::{
    non_negative_integer_size, put_non_negative_integer, put_var_number, var_number_size,
    MAX_VAR_NUMBER_SIZE,
};

/// Sink for back-to-front TLV encoding.
///
/// Every `prepend_*` method returns the number of bytes it accounted for.
pub trait Encoder {
    /// Prepend raw bytes.
    fn prepend_bytes(&mut self, bytes: &[u8]) -> usize;

    /// Prepend a VarNumber.
    fn prepend_var_number(&mut self, n: u64) -> usize;

    /// Prepend a shortest-form nonNegativeInteger (no Type/Length).
    fn prepend_non_negative_integer(&mut self, n: u64) -> usize;

    /// Prepend a single byte.
    fn prepend_byte(&mut self, byte: u8) -> usize {
        self.prepend_bytes(&[byte])
    }

    /// Prepend a Type/Length header for a value of `length` bytes.
    fn prepend_tl(&mut self, tlv_type: u32, length: usize) -> usize {
        let mut written = self.prepend_var_number(length as u64);
        written += self.prepend_var_number(tlv_type as u64);
        written
    }

    /// Prepend a complete TLV whose value is `value`.
    fn prepend_byte_array_block(&mut self, tlv_type: u32, value: &[u8]) -> usize {
        let len = self.prepend_bytes(value);
        len + self.prepend_tl(tlv_type, len)
    }

    /// Prepend a zero-length TLV.
    fn prepend_empty_block(&mut self, tlv_type: u32) -> usize {
        self.prepend_tl(tlv_type, 0)
    }

    /// Prepend a TLV whose value is the nonNegativeInteger `n`.
    fn prepend_non_negative_integer_block(&mut self, tlv_type: u32, n: u64) -> usize {
        let len = self.prepend_non_negative_integer(n);
        len + self.prepend_tl(tlv_type, len)
    }

    /// Prepend a block, reusing its wire bytes when it has them.
    fn prepend_block(&mut self, block: &Block) -> usize
    where
        Self: Sized,
    {
        block.encode_to(self)
    }

    /// Prepend a TLV whose value is produced by `value`.
    fn prepend_nested<F>(&mut self, tlv_type: u32, value: F) -> usize
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> usize,
    {
        let len = value(self);
        len + self.prepend_tl(tlv_type, len)
    }

    /// Fallible form of [`Encoder::prepend_nested`].
    fn try_prepend_nested<F>(&mut self, tlv_type: u32, value: F) -> Result<usize>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<usize>,
    {
        let len = value(self)?;
        Ok(len + self.prepend_tl(tlv_type, len))
    }
}

/// Measuring pass: counts bytes without writing any.
#[derive(Debug, Default, Clone, Copy)]
pub struct Estimator {
    total: usize,
}

impl Estimator {
    /// Create an estimator with a zero count.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bytes accounted for so far.
    pub fn total(&self) -> usize {
        self.total
    }
}

impl Encoder for Estimator {
    fn prepend_bytes(&mut self, bytes: &[u8]) -> usize {
        self.total += bytes.len();
        bytes.len()
    }

    fn prepend_var_number(&mut self, n: u64) -> usize {
        let size = var_number_size(n);
        self.total += size;
        size
    }

    fn prepend_non_negative_integer(&mut self, n: u64) -> usize {
        let size = non_negative_integer_size(n);
        self.total += size;
        size
    }
}

/// Emitting pass: a buffer filled from the back.
///
/// The encoded bytes live in `buf[head..tail]`. Prepending moves `head`
/// toward the front; appending (used when a signature is attached to an
/// already-encoded signed portion) moves `tail` toward the back. Either side
/// grows on demand, but a buffer sized by an [`Estimator`] never reallocates.
#[derive(Debug, Clone)]
pub struct EncodingBuffer {
    buf: Vec<u8>,
    head: usize,
    tail: usize,
}

impl EncodingBuffer {
    /// Reserve `capacity` bytes for prepending.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(capacity, 0)
    }

    /// Reserve `total` bytes, of which `reserve_back` are kept for appending.
    pub fn new(total: usize, reserve_back: usize) -> Self {
        let total = total.max(reserve_back);
        let head = total - reserve_back;
        Self {
            buf: vec![0; total],
            head,
            tail: head,
        }
    }

    /// Number of encoded bytes.
    pub fn len(&self) -> usize {
        self.tail - self.head
    }

    /// True if nothing has been encoded.
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// The encoded bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[self.head..self.tail]
    }

    /// Freeze into a shared buffer without copying.
    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.buf).slice(self.head..self.tail)
    }

    /// Append raw bytes after the encoded region.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> usize {
        let end = self.tail + bytes.len();
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[self.tail..end].copy_from_slice(bytes);
        self.tail = end;
        bytes.len()
    }

    /// Append a VarNumber after the encoded region.
    pub fn append_var_number(&mut self, n: u64) -> usize {
        let mut scratch = Vec::with_capacity(MAX_VAR_NUMBER_SIZE);
        put_var_number(&mut scratch, n);
        self.append_bytes(&scratch)
    }

    /// Append a complete TLV after the encoded region.
    pub fn append_byte_array_block(&mut self, tlv_type: u32, value: &[u8]) -> usize {
        let mut written = self.append_var_number(tlv_type as u64);
        written += self.append_var_number(value.len() as u64);
        written + self.append_bytes(value)
    }

    fn reserve_front(&mut self, needed: usize) {
        if self.head >= needed {
            return;
        }
        let grow = needed.max(self.buf.len()).max(16);
        let mut grown = vec![0; grow + self.buf.len()];
        grown[grow..].copy_from_slice(&self.buf);
        self.buf = grown;
        self.head += grow;
        self.tail += grow;
    }
}

impl Encoder for EncodingBuffer {
    fn prepend_bytes(&mut self, bytes: &[u8]) -> usize {
        self.reserve_front(bytes.len());
        let start = self.head - bytes.len();
        self.buf[start..self.head].copy_from_slice(bytes);
        self.head = start;
        bytes.len()
    }

    fn prepend_var_number(&mut self, n: u64) -> usize {
        let mut scratch = Vec::with_capacity(MAX_VAR_NUMBER_SIZE);
        put_var_number(&mut scratch, n);
        self.prepend_bytes(&scratch)
    }

    fn prepend_non_negative_integer(&mut self, n: u64) -> usize {
        let mut scratch = Vec::with_capacity(8);
        put_non_negative_integer(&mut scratch, n);
        self.prepend_bytes(&scratch)
    }
}

/// A value with a TLV wire encoding produced by the two-pass scheme.
pub trait TlvEncode {
    /// Prepend the full encoding to `encoder`, returning its size.
    ///
    /// Called once with an [`Estimator`] and once with an [`EncodingBuffer`];
    /// both calls must account for the same number of bytes.
    fn encode_to<E: Encoder>(&self, encoder: &mut E) -> Result<usize>;

    /// Measure, then emit into an exactly sized buffer.
    fn encode_to_bytes(&self) -> Result<Bytes> {
        let mut estimator = Estimator::new();
        let estimated = self.encode_to(&mut estimator)?;

        let mut buffer = EncodingBuffer::with_capacity(estimated);
        let written = self.encode_to(&mut buffer)?;
        debug_assert_eq!(estimated, written, "estimate and emit disagree");

        Ok(buffer.into_bytes())
    }
}
