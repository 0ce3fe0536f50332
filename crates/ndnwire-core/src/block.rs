//! Block: an in-memory TLV element.
//!
//! A block is either parsed (it views a range of a shared, reference-counted
//! buffer) or composite (it owns a list of child blocks that have not been
//! flattened yet). Parsing and slicing never copy bytes: every child holds a
//! `Bytes` handle into its parent's buffer, so the buffer stays alive as long
//! as any view does.
//!
//! Mutating a block's children drops its cached wire encoding; blocks that
//! were extracted earlier keep pointing at the old buffer and remain valid
//! read-only snapshots.

use bytes::Bytes;
use std::fmt;

use crate::encoder::{Encoder, EncodingBuffer, Estimator};
use crate::error::{DecodeError, PreconditionError};
use crate::tlv;
use crate::varnum::{
    decode_non_negative_integer, decode_type, decode_var_number, encode_non_negative_integer,
    var_number_size,
};

/// A TLV element.
///
/// Invariants:
/// - with a wire encoding, `value` is the TLV-VALUE slice of `wire`, and any
///   parsed `elements` are slices of `value`;
/// - without one and without elements, `value` is the leaf value;
/// - without one but with elements, the elements are authoritative and
///   `value` is empty until [`Block::encode`] runs.
#[derive(Clone, Default)]
pub struct Block {
    tlv_type: u32,
    wire: Option<Bytes>,
    value: Bytes,
    elements: Vec<Block>,
}

impl Block {
    /// An empty block of the given type with no wire encoding.
    pub fn new(tlv_type: u32) -> Self {
        Self {
            tlv_type,
            ..Default::default()
        }
    }

    /// A leaf block with the given value.
    ///
    /// The value is shared, not copied; the wire form is built on [`Block::encode`].
    pub fn from_value(tlv_type: u32, value: impl Into<Bytes>) -> Self {
        Self {
            tlv_type,
            wire: None,
            value: value.into(),
            elements: Vec::new(),
        }
    }

    /// A leaf block whose value is the nonNegativeInteger `n`.
    pub fn from_non_negative_integer(tlv_type: u32, n: u64) -> Self {
        Self::from_value(tlv_type, encode_non_negative_integer(n))
    }

    /// A composite block with the given children.
    pub fn nested(tlv_type: u32, elements: Vec<Block>) -> Self {
        Self {
            tlv_type,
            wire: None,
            value: Bytes::new(),
            elements,
        }
    }

    /// Decode a buffer that holds exactly one TLV element, without copying.
    pub fn decode(wire: Bytes) -> Result<Self, DecodeError> {
        let block = Self::decode_first(&wire)?;
        if block.size() != wire.len() {
            return Err(DecodeError::LengthMismatch {
                element: block.size(),
                buffer: wire.len(),
            });
        }
        Ok(block)
    }

    /// Decode the first TLV element of `buf`, without copying.
    ///
    /// Bytes after the element are ignored; use [`Block::size`] to advance.
    pub fn decode_first(buf: &Bytes) -> Result<Self, DecodeError> {
        let (tlv_type, value_start, value_end) = read_header(buf, 0)?;
        Ok(Self {
            tlv_type,
            wire: Some(buf.slice(0..value_end)),
            value: buf.slice(value_start..value_end),
            elements: Vec::new(),
        })
    }

    /// Decode the first TLV element of `bytes` into a private copy.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (_, _, end) = read_header(bytes, 0)?;
        Self::decode(Bytes::copy_from_slice(&bytes[..end]))
    }

    /// Speculatively decode the element starting at `offset`.
    ///
    /// Returns `None` instead of an error when the buffer holds no complete
    /// element there, e.g. while a stream is still being received.
    pub fn try_decode_at(buf: &Bytes, offset: usize) -> Option<Self> {
        if offset > buf.len() {
            return None;
        }
        match read_header(&buf[offset..], 0) {
            Ok((tlv_type, value_start, value_end)) => Some(Self {
                tlv_type,
                wire: Some(buf.slice(offset..offset + value_end)),
                value: buf.slice(offset + value_start..offset + value_end),
                elements: Vec::new(),
            }),
            Err(e) => {
                tracing::trace!(offset, error = %e, "no complete TLV element at offset");
                None
            }
        }
    }

    /// The TLV-TYPE.
    pub fn tlv_type(&self) -> u32 {
        self.tlv_type
    }

    /// A block is valid unless its type is the reserved value 0.
    pub fn is_valid(&self) -> bool {
        self.tlv_type != tlv::INVALID
    }

    /// Whether a wire encoding is cached.
    pub fn has_wire(&self) -> bool {
        self.wire.is_some()
    }

    /// The cached wire encoding, if any.
    pub fn wire(&self) -> Option<&Bytes> {
        self.wire.as_ref()
    }

    /// Whether the block carries a value (possibly through unflattened children).
    pub fn has_value(&self) -> bool {
        !self.value.is_empty() || !self.elements.is_empty()
    }

    /// The TLV-VALUE bytes.
    ///
    /// Empty for a composite block that has not been encoded yet; see
    /// [`Block::value_bytes`].
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// The TLV-VALUE bytes, flattening children if needed.
    pub fn value_bytes(&self) -> Bytes {
        if self.wire.is_some() || self.elements.is_empty() {
            return self.value.clone();
        }
        let mut estimator = Estimator::new();
        let len = self.encode_value_to(&mut estimator);
        let mut buffer = EncodingBuffer::with_capacity(len);
        self.encode_value_to(&mut buffer);
        buffer.into_bytes()
    }

    /// Length of the TLV-VALUE.
    pub fn value_size(&self) -> usize {
        if self.wire.is_some() || self.elements.is_empty() {
            return self.value.len();
        }
        let mut estimator = Estimator::new();
        self.encode_value_to(&mut estimator)
    }

    /// Total encoded size: Type + Length + Value.
    pub fn size(&self) -> usize {
        match &self.wire {
            Some(wire) => wire.len(),
            None => {
                let value_size = self.value_size();
                var_number_size(self.tlv_type as u64)
                    + var_number_size(value_size as u64)
                    + value_size
            }
        }
    }

    /// Materialize the direct children from the TLV-VALUE.
    ///
    /// Idempotent, and a no-op on an empty value. On error the block is left
    /// unparsed.
    pub fn parse(&mut self) -> Result<(), DecodeError> {
        if !self.elements.is_empty() || self.value.is_empty() {
            return Ok(());
        }

        let mut elements = Vec::new();
        let mut pos = 0;
        while pos < self.value.len() {
            let (tlv_type, value_start, value_end) = read_header(&self.value, pos)?;
            elements.push(Self {
                tlv_type,
                wire: Some(self.value.slice(pos..value_end)),
                value: self.value.slice(value_start..value_end),
                elements: Vec::new(),
            });
            pos = value_end;
        }

        self.elements = elements;
        Ok(())
    }

    /// Parsed or appended children.
    pub fn elements(&self) -> &[Block] {
        &self.elements
    }

    /// The first child of the given type.
    ///
    /// The block must have been parsed; an absent child is a precondition
    /// violation. Use [`Block::find`] when absence is expected.
    pub fn get(&self, tlv_type: u32) -> Result<&Block, PreconditionError> {
        self.find(tlv_type).ok_or(PreconditionError::NoSuchElement {
            parent: self.tlv_type,
            child: tlv_type,
        })
    }

    /// The first child of the given type, if any.
    pub fn find(&self, tlv_type: u32) -> Option<&Block> {
        self.elements.iter().find(|e| e.tlv_type == tlv_type)
    }

    /// Append a child.
    ///
    /// The block should be parsed first; unparsed value bytes are discarded.
    pub fn push_back(&mut self, element: Block) {
        self.invalidate();
        self.elements.push(element);
    }

    /// Insert a child at `index`; at most `self.elements().len()`.
    pub fn insert(&mut self, index: usize, element: Block) -> Result<(), PreconditionError> {
        if index > self.elements.len() {
            return Err(PreconditionError::ElementIndexOutOfRange {
                index,
                len: self.elements.len(),
            });
        }
        self.invalidate();
        self.elements.insert(index, element);
        Ok(())
    }

    /// Remove and return the child at `index`.
    pub fn erase(&mut self, index: usize) -> Option<Block> {
        if index >= self.elements.len() {
            return None;
        }
        self.invalidate();
        Some(self.elements.remove(index))
    }

    /// Remove every child of the given type, returning how many were removed.
    pub fn remove(&mut self, tlv_type: u32) -> usize {
        let before = self.elements.len();
        self.elements.retain(|e| e.tlv_type != tlv_type);
        let removed = before - self.elements.len();
        if removed > 0 {
            self.invalidate();
        }
        removed
    }

    /// Drop the cached wire encoding.
    ///
    /// Children are kept; the next [`Block::encode`] rebuilds the wire from
    /// them. Previously extracted blocks are unaffected.
    pub fn reset_wire(&mut self) {
        self.wire = None;
        if !self.elements.is_empty() {
            self.value = Bytes::new();
        }
    }

    fn invalidate(&mut self) {
        self.wire = None;
        self.value = Bytes::new();
    }

    /// Flatten into a cached wire encoding and return it.
    ///
    /// No-op if the wire is already present. Children are re-pointed into the
    /// new buffer.
    pub fn encode(&mut self) -> &Bytes {
        if self.wire.is_none() {
            let value_size = self.value_size();
            let wire = self.to_wire();
            self.value = wire.slice(wire.len() - value_size..);
            if !self.elements.is_empty() {
                let previous = std::mem::take(&mut self.elements);
                if self.parse().is_err() {
                    self.elements = previous;
                }
            }
            self.wire = Some(wire);
        }
        self.wire.get_or_insert_with(Bytes::new)
    }

    /// The wire encoding, built without caching it.
    pub fn to_wire(&self) -> Bytes {
        if let Some(wire) = &self.wire {
            return wire.clone();
        }
        let mut estimator = Estimator::new();
        let size = self.encode_to(&mut estimator);
        let mut buffer = EncodingBuffer::with_capacity(size);
        self.encode_to(&mut buffer);
        buffer.into_bytes()
    }

    /// Prepend this block to `encoder`, returning the bytes written.
    pub fn encode_to<E: Encoder>(&self, encoder: &mut E) -> usize {
        if let Some(wire) = &self.wire {
            return encoder.prepend_bytes(wire);
        }
        let len = self.encode_value_to(encoder);
        len + encoder.prepend_tl(self.tlv_type, len)
    }

    fn encode_value_to<E: Encoder>(&self, encoder: &mut E) -> usize {
        if self.wire.is_some() || self.elements.is_empty() {
            return encoder.prepend_bytes(&self.value);
        }
        let mut len = 0;
        for element in self.elements.iter().rev() {
            len += element.encode_to(encoder);
        }
        len
    }

    /// Decode the TLV-VALUE as exactly one nested element.
    pub fn block_from_value(&self) -> Result<Block, DecodeError> {
        Block::decode(self.value_bytes())
    }

    /// Interpret the TLV-VALUE as a nonNegativeInteger.
    pub fn read_non_negative_integer(&self) -> Result<u64, DecodeError> {
        decode_non_negative_integer(&self.value_bytes())
    }
}

/// Read a Type/Length header at `pos`; returns (type, value start, value end).
fn read_header(buf: &[u8], pos: usize) -> Result<(u32, usize, usize), DecodeError> {
    let (tlv_type, type_len) = decode_type(&buf[pos..])?;
    let (length, length_len) = decode_var_number(&buf[pos + type_len..])?;
    let value_start = pos + type_len + length_len;
    let remaining = buf.len() - value_start;
    if length > remaining as u64 {
        return Err(DecodeError::LengthOverflow {
            tlv_type,
            length,
            remaining,
        });
    }
    Ok((tlv_type, value_start, value_start + length as usize))
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.tlv_type == other.tlv_type
            && self.value_size() == other.value_size()
            && self.value_bytes() == other.value_bytes()
    }
}

impl Eq for Block {}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("type", &self.tlv_type)
            .field("size", &self.size())
            .field("has_wire", &self.has_wire())
            .field("elements", &self.elements.len())
            .finish()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "[invalid]");
        }
        if !self.elements.is_empty() {
            write!(f, "{}[{}]={{", self.tlv_type, self.value_size())?;
            for (i, element) in self.elements.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{element}")?;
            }
            return write!(f, "}}");
        }
        if self.value.is_empty() {
            return write!(f, "{}[empty]", self.tlv_type);
        }
        write!(
            f,
            "{}[{}]={}",
            self.tlv_type,
            self.value.len(),
            hex::encode_upper(&self.value)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn name_ab() -> Bytes {
        Bytes::from_static(&[0x07, 0x06, 0x08, 0x01, b'a', 0x08, 0x01, b'b'])
    }

    #[test]
    fn test_decode_and_parse() {
        let mut block = Block::decode(name_ab()).unwrap();
        assert_eq!(block.tlv_type(), tlv::NAME);
        assert_eq!(block.size(), 8);
        assert_eq!(block.value_size(), 6);
        assert!(block.elements().is_empty());

        block.parse().unwrap();
        assert_eq!(block.elements().len(), 2);
        assert_eq!(block.elements()[0].value(), b"a");
        assert_eq!(block.elements()[1].value(), b"b");

        // idempotent
        block.parse().unwrap();
        assert_eq!(block.elements().len(), 2);
    }

    #[test]
    fn test_children_share_parent_buffer() {
        let wire = name_ab();
        let mut block = Block::decode(wire.clone()).unwrap();
        block.parse().unwrap();
        let child = block.elements()[1].wire().unwrap();
        assert_eq!(child.as_ptr(), wire[5..].as_ptr());
    }

    #[test]
    fn test_decode_rejects_overflowing_length() {
        let err = Block::decode(Bytes::from_static(&[0x07, 0x05, 0x08, 0x01])).unwrap_err();
        assert_eq!(
            err,
            DecodeError::LengthOverflow {
                tlv_type: 7,
                length: 5,
                remaining: 2
            }
        );
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let err = Block::decode(Bytes::from_static(&[0x08, 0x01, b'a', 0xFF])).unwrap_err();
        assert!(matches!(err, DecodeError::LengthMismatch { element: 3, buffer: 4 }));
    }

    #[test]
    fn test_decode_rejects_zero_type() {
        let err = Block::decode(Bytes::from_static(&[0x00, 0x00])).unwrap_err();
        assert_eq!(err, DecodeError::IllegalType(0));
    }

    #[test]
    fn test_parse_rejects_child_overrun() {
        let mut block = Block::decode(Bytes::from_static(&[0x07, 0x03, 0x08, 0x05, b'a'])).unwrap();
        let err = block.parse().unwrap_err();
        assert!(matches!(err, DecodeError::LengthOverflow { tlv_type: 8, .. }));
        assert!(block.elements().is_empty());
    }

    #[test]
    fn test_try_decode_at_partial_buffer() {
        let buf = Bytes::from_static(&[0x08, 0x01, b'a', 0x08, 0x03, b'b']);
        let first = Block::try_decode_at(&buf, 0).unwrap();
        assert_eq!(first.value(), b"a");
        assert!(Block::try_decode_at(&buf, first.size()).is_none());
        assert!(Block::try_decode_at(&buf, 100).is_none());
        assert!(Block::try_decode_at(&buf, buf.len()).is_none());
    }

    #[test]
    fn test_from_slice_copies_first_element() {
        let raw = [0x08, 0x02, b'h', b'i', 0x99];
        let block = Block::from_slice(&raw).unwrap();
        assert_eq!(block.size(), 4);
        assert_eq!(block.value(), b"hi");
    }

    #[test]
    fn test_get_and_find() {
        let mut block = Block::decode(name_ab()).unwrap();
        block.parse().unwrap();
        assert!(block.find(tlv::GENERIC_NAME_COMPONENT).is_some());
        assert!(block.find(tlv::NONCE).is_none());
        assert_eq!(
            block.get(tlv::NONCE).unwrap_err(),
            PreconditionError::NoSuchElement {
                parent: tlv::NAME,
                child: tlv::NONCE
            }
        );
    }

    #[test]
    fn test_composite_encode() {
        let mut block = Block::new(tlv::NAME);
        block.push_back(Block::from_value(tlv::GENERIC_NAME_COMPONENT, &b"a"[..]));
        block.push_back(Block::from_value(tlv::GENERIC_NAME_COMPONENT, &b"b"[..]));
        assert!(!block.has_wire());
        assert_eq!(block.size(), 8);

        let wire = block.encode().clone();
        assert_eq!(wire, name_ab());
        assert!(block.has_wire());
        assert_eq!(block.elements().len(), 2);
        assert_eq!(
            block.elements()[0].wire().unwrap().as_ptr(),
            wire[2..].as_ptr()
        );
    }

    #[test]
    fn test_mutation_keeps_extracted_children_valid() {
        let mut block = Block::decode(name_ab()).unwrap();
        block.parse().unwrap();
        let extracted = block.elements()[0].clone();

        block.erase(0);
        block.push_back(Block::from_value(tlv::GENERIC_NAME_COMPONENT, &b"c"[..]));
        assert!(!block.has_wire());
        block.encode();

        assert_eq!(extracted.value(), b"a");
        assert_eq!(
            block.to_wire().as_ref(),
            &[0x07, 0x06, 0x08, 0x01, b'b', 0x08, 0x01, b'c']
        );
    }

    #[test]
    fn test_remove_and_insert() {
        let mut block = Block::decode(name_ab()).unwrap();
        block.parse().unwrap();
        block.insert(1, Block::new(tlv::NONCE)).unwrap();
        assert_eq!(block.elements()[1].tlv_type(), tlv::NONCE);

        // past the end is an error and leaves the wire intact
        let mut untouched = Block::decode(name_ab()).unwrap();
        untouched.parse().unwrap();
        assert_eq!(
            untouched.insert(3, Block::new(tlv::NONCE)),
            Err(PreconditionError::ElementIndexOutOfRange { index: 3, len: 2 })
        );
        assert!(untouched.has_wire());
        assert!(untouched.insert(2, Block::new(tlv::NONCE)).is_ok());
        assert_eq!(block.remove(tlv::GENERIC_NAME_COMPONENT), 2);
        assert_eq!(block.elements().len(), 1);
        assert_eq!(block.remove(tlv::GENERIC_NAME_COMPONENT), 0);
        assert!(block.erase(5).is_none());
    }

    #[test]
    fn test_equality_independent_of_parse_state() {
        let parsed = {
            let mut b = Block::decode(name_ab()).unwrap();
            b.parse().unwrap();
            b
        };
        let unparsed = Block::decode(name_ab()).unwrap();
        let composite = Block::nested(
            tlv::NAME,
            vec![
                Block::from_value(tlv::GENERIC_NAME_COMPONENT, &b"a"[..]),
                Block::from_value(tlv::GENERIC_NAME_COMPONENT, &b"b"[..]),
            ],
        );
        assert_eq!(parsed, unparsed);
        assert_eq!(parsed, composite);
        assert_ne!(parsed, Block::new(tlv::NAME));
    }

    #[test]
    fn test_block_from_value() {
        let outer = Block::decode(Bytes::from_static(&[0x1A, 0x03, 0x08, 0x01, b'x'])).unwrap();
        let inner = outer.block_from_value().unwrap();
        assert_eq!(inner.tlv_type(), tlv::GENERIC_NAME_COMPONENT);
        assert_eq!(inner.value(), b"x");

        let bad = Block::decode(Bytes::from_static(&[0x1A, 0x04, 0x08, 0x01, b'x', 0x00])).unwrap();
        assert!(bad.block_from_value().is_err());
    }

    #[test]
    fn test_non_negative_integer_block() {
        let block = Block::from_non_negative_integer(tlv::INTEREST_LIFETIME, 4000);
        assert_eq!(block.to_wire().as_ref(), &[0x0C, 0x02, 0x0F, 0xA0]);
        assert_eq!(block.read_non_negative_integer(), Ok(4000));
    }

    #[test]
    fn test_display() {
        let mut block = Block::decode(name_ab()).unwrap();
        assert_eq!(block.to_string(), "7[6]=080161080162");
        block.parse().unwrap();
        assert_eq!(block.to_string(), "7[6]={8[1]=61,8[1]=62}");
        assert_eq!(Block::new(33).to_string(), "33[empty]");
        assert_eq!(Block::default().to_string(), "[invalid]");
    }

    proptest! {
        #[test]
        fn block_roundtrip(
            tlv_type in 1u32..=u32::MAX,
            value in prop::collection::vec(any::<u8>(), 0..600),
        ) {
            let block = Block::from_value(tlv_type, value);
            let decoded = Block::decode(block.to_wire()).unwrap();
            prop_assert_eq!(&decoded, &block);
            prop_assert_eq!(decoded.size(), block.size());
        }

        #[test]
        fn nested_roundtrip_any_parse_state(
            values in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..40), 0..8),
            parse_first: bool,
        ) {
            let children = values
                .into_iter()
                .map(|v| Block::from_value(tlv::GENERIC_NAME_COMPONENT, v))
                .collect();
            let composite = Block::nested(tlv::NAME, children);
            let mut decoded = Block::decode(composite.to_wire()).unwrap();
            if parse_first {
                decoded.parse().unwrap();
            }
            prop_assert_eq!(&decoded, &composite);
        }
    }
}
