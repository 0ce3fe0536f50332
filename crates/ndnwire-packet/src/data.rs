//! Data packets.
//!
//! ```text
//! Data = DATA-TYPE TLV-LENGTH
//!          Name
//!          [MetaInfo]
//!          [Content]
//!          SignatureInfo
//!          SignatureValue
//! ```
//!
//! A Data keeps its last wire encoding until a field changes. The full
//! name (name plus the implicit SHA-256 digest of the wire) is derived from
//! that encoding, so it is only available after the packet has been
//! encoded or decoded.

use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use ndnwire_core::varnum::MAX_VAR_NUMBER_SIZE;
use ndnwire_core::{
    tlv, Block, DecodeError, Encoder, EncodingBuffer, Estimator, PreconditionError, Result,
    TlvEncode,
};
use ndnwire_name::{Component, Name};

use crate::key_locator::KeyLocator;
use crate::meta_info::MetaInfo;
use crate::signature_info::{SignatureInfo, SignatureInfoKind};
use crate::types::{ContentType, SignatureType};

/// Space kept after a signed portion for the SignatureValue element.
const SIGNATURE_RESERVE: usize = 128;

/// A Data packet.
#[derive(Debug, Clone, Default)]
pub struct Data {
    name: Name,
    meta_info: MetaInfo,
    content: Option<Block>,
    signature_info: SignatureInfo,
    signature_value: Option<Block>,
    wire: Option<Bytes>,
    full_name: OnceLock<Name>,
}

impl Data {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Decode a buffer holding exactly one Data element.
    pub fn decode(wire: Bytes) -> std::result::Result<Self, DecodeError> {
        Self::wire_decode(&Block::decode(wire)?)
    }

    /// Decode a Data element.
    pub fn wire_decode(block: &Block) -> std::result::Result<Self, DecodeError> {
        if block.tlv_type() != tlv::DATA {
            return Err(DecodeError::UnexpectedType {
                expected: tlv::DATA,
                actual: block.tlv_type(),
            });
        }
        let mut block = block.clone();
        block.parse()?;
        let mut elements = block.elements().iter();

        let name = match elements.next() {
            Some(e) if e.tlv_type() == tlv::NAME => Name::wire_decode(e)?,
            _ => return Err(DecodeError::Missing("Name")),
        };
        let mut data = Self::new(name);
        let mut signature_info = None;

        let mut last_element = 1;
        for element in elements {
            let (rank, label) = match element.tlv_type() {
                tlv::META_INFO => (2, "MetaInfo"),
                tlv::CONTENT => (3, "Content"),
                tlv::SIGNATURE_INFO => (4, "SignatureInfo"),
                tlv::SIGNATURE_VALUE => (5, "SignatureValue"),
                tlv::NAME => return Err(DecodeError::OutOfOrder("Name")),
                other if tlv::is_critical_type(other) => {
                    return Err(DecodeError::UnrecognizedCritical(other))
                }
                other => {
                    tracing::trace!(tlv_type = other, "ignoring non-critical element in Data");
                    continue;
                }
            };
            if last_element >= rank {
                return Err(DecodeError::OutOfOrder(label));
            }
            match rank {
                2 => data.meta_info = MetaInfo::wire_decode(element)?,
                3 => data.content = Some(element.clone()),
                4 => signature_info = Some(SignatureInfo::wire_decode(element)?),
                _ => data.signature_value = Some(element.clone()),
            }
            last_element = rank;
        }

        data.signature_info = signature_info.ok_or(DecodeError::Missing("SignatureInfo"))?;
        if data.signature_value.is_none() {
            return Err(DecodeError::Missing("SignatureValue"));
        }
        data.wire = Some(block.to_wire());
        Ok(data)
    }

    /// Prepend the Data to `encoder`.
    ///
    /// With `signed_portion_only`, the SignatureValue and the outer
    /// Type/Length are left out; see [`Data::finalize`].
    pub fn encode_with<E: Encoder>(&self, encoder: &mut E, signed_portion_only: bool) -> Result<usize> {
        let mut len = 0;
        if !signed_portion_only {
            let value = self.signature_value.as_ref().ok_or(PreconditionError::Unsigned)?;
            len += value.encode_to(encoder);
        }
        len += self.signature_info.encode_to(encoder, SignatureInfoKind::Data)?;
        if let Some(content) = &self.content {
            len += content.encode_to(encoder);
        }
        len += self.meta_info.encode_to(encoder);
        len += self.name.prepend_to(encoder);
        if !signed_portion_only {
            len += encoder.prepend_tl(tlv::DATA, len);
        }
        Ok(len)
    }

    /// Encode, caching the wire.
    pub fn wire_encode(&mut self) -> Result<Bytes> {
        if let Some(wire) = &self.wire {
            return Ok(wire.clone());
        }
        let wire = self.encode_to_bytes()?;
        self.wire = Some(wire.clone());
        Ok(wire)
    }

    /// The cached wire encoding, if the packet has been encoded or decoded
    /// since its last change.
    pub fn wire(&self) -> Option<&Bytes> {
        self.wire.as_ref()
    }

    /// Encode the signed portion into a buffer that [`Data::finalize`] can
    /// complete without copying.
    pub fn encode_signed_portion(&self) -> Result<EncodingBuffer> {
        let mut estimator = Estimator::new();
        let size = self.encode_with(&mut estimator, true)?;
        let mut buffer = EncodingBuffer::new(
            2 * MAX_VAR_NUMBER_SIZE + size + SIGNATURE_RESERVE,
            SIGNATURE_RESERVE,
        );
        self.encode_with(&mut buffer, true)?;
        Ok(buffer)
    }

    /// Attach `signature_value` to a buffer from [`Data::encode_signed_portion`]
    /// and close the outer element.
    pub fn finalize(&mut self, mut buffer: EncodingBuffer, signature_value: impl Into<Bytes>) -> Result<Bytes> {
        let signature_value = signature_value.into();
        buffer.append_byte_array_block(tlv::SIGNATURE_VALUE, &signature_value);
        buffer.prepend_tl(tlv::DATA, buffer.len());
        let wire = buffer.into_bytes();

        self.set_signature_value(signature_value);
        self.wire = Some(wire.clone());
        Ok(wire)
    }

    /// The bytes covered by the signature: Name through SignatureInfo.
    ///
    /// Uses the cached wire when present; otherwise encodes the signed
    /// portion, which does not require a SignatureValue.
    pub fn extract_signed_ranges(&self) -> Result<Vec<Bytes>> {
        if let Some(wire) = &self.wire {
            let mut block = Block::decode(wire.clone())?;
            block.parse()?;
            let value = block.value_bytes();
            let end = block
                .elements()
                .iter()
                .take_while(|e| e.tlv_type() != tlv::SIGNATURE_VALUE)
                .map(Block::size)
                .sum::<usize>();
            return Ok(vec![value.slice(..end)]);
        }
        Ok(vec![self.encode_signed_portion()?.into_bytes()])
    }

    /// Name plus an ImplicitSha256DigestComponent of the full encoding.
    ///
    /// Requires a wire encoding; see [`Data::wire_encode`].
    pub fn full_name(&self) -> Result<Name> {
        let wire = self.wire.as_ref().ok_or(PreconditionError::NotEncoded)?;
        if let Some(name) = self.full_name.get() {
            return Ok(name.clone());
        }
        let mut name = self.name.clone();
        name.append(Component::from_implicit_sha256_digest(Sha256::digest(wire).into()));
        Ok(self.full_name.get_or_init(|| name).clone())
    }

    fn reset_wire(&mut self) {
        self.wire = None;
        self.full_name = OnceLock::new();
    }

    // Fields

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn set_name(&mut self, name: Name) -> &mut Self {
        self.name = name;
        self.reset_wire();
        self
    }

    pub fn meta_info(&self) -> &MetaInfo {
        &self.meta_info
    }

    pub fn set_meta_info(&mut self, meta_info: MetaInfo) -> &mut Self {
        self.meta_info = meta_info;
        self.reset_wire();
        self
    }

    pub fn content_type(&self) -> ContentType {
        self.meta_info.content_type()
    }

    pub fn set_content_type(&mut self, content_type: ContentType) -> &mut Self {
        self.meta_info.set_content_type(content_type);
        self.reset_wire();
        self
    }

    pub fn freshness_period(&self) -> Duration {
        self.meta_info.freshness_period()
    }

    pub fn set_freshness_period(&mut self, period: Duration) -> &mut Self {
        self.meta_info.set_freshness_period(period);
        self.reset_wire();
        self
    }

    pub fn final_block_id(&self) -> Option<&Component> {
        self.meta_info.final_block_id()
    }

    pub fn set_final_block_id(&mut self, id: Option<Component>) -> &mut Self {
        self.meta_info.set_final_block_id(id);
        self.reset_wire();
        self
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// The Content element.
    pub fn content(&self) -> Option<&Block> {
        self.content.as_ref()
    }

    /// The Content element's value.
    pub fn content_bytes(&self) -> Option<Bytes> {
        self.content.as_ref().map(Block::value_bytes)
    }

    /// Set the Content element. A block of another type is wrapped in one.
    pub fn set_content(&mut self, block: Block) -> &mut Self {
        let content = if block.tlv_type() == tlv::CONTENT {
            block
        } else {
            Block::nested(tlv::CONTENT, vec![block])
        };
        self.content = Some(content);
        self.reset_wire();
        self
    }

    pub fn set_content_bytes(&mut self, value: impl Into<Bytes>) -> &mut Self {
        self.content = Some(Block::from_value(tlv::CONTENT, value));
        self.reset_wire();
        self
    }

    pub fn unset_content(&mut self) -> &mut Self {
        self.content = None;
        self.reset_wire();
        self
    }

    pub fn signature_info(&self) -> &SignatureInfo {
        &self.signature_info
    }

    pub fn set_signature_info(&mut self, info: SignatureInfo) -> &mut Self {
        self.signature_info = info;
        self.reset_wire();
        self
    }

    pub fn signature_type(&self) -> Option<SignatureType> {
        self.signature_info.signature_type()
    }

    pub fn key_locator(&self) -> Option<&KeyLocator> {
        self.signature_info.key_locator()
    }

    /// The SignatureValue element's value.
    pub fn signature_value(&self) -> Option<Bytes> {
        self.signature_value.as_ref().map(Block::value_bytes)
    }

    pub fn set_signature_value(&mut self, value: impl Into<Bytes>) -> &mut Self {
        self.signature_value = Some(Block::from_value(tlv::SIGNATURE_VALUE, value));
        self.reset_wire();
        self
    }
}

impl TlvEncode for Data {
    fn encode_to<E: Encoder>(&self, encoder: &mut E) -> Result<usize> {
        self.encode_with(encoder, false)
    }
}

impl PartialEq for Data {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.meta_info == other.meta_info
            && self.content == other.content
            && self.signature_info == other.signature_info
            && self.signature_value == other.signature_value
    }
}

impl Eq for Data {}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "MetaInfo: [{}]", self.meta_info)?;
        if let Some(content) = &self.content {
            writeln!(f, "Content: [{} bytes]", content.value_size())?;
        }
        write!(f, "Signature: [type: ")?;
        match self.signature_info.signature_type() {
            Some(t) => write!(f, "{t}")?,
            None => write!(f, "Invalid")?,
        }
        let length = self.signature_value.as_ref().map_or(0, Block::value_size);
        writeln!(f, ", length: {length}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndnwire_core::Error;

    fn unsigned() -> Data {
        let mut data = Data::new("/a".parse().unwrap());
        data.set_content_bytes(&b"hi"[..])
            .set_signature_info(SignatureInfo::new(SignatureType::DIGEST_SHA256));
        data
    }

    fn signed() -> Data {
        let mut data = unsigned();
        data.set_signature_value(vec![0xAA; 4]);
        data
    }

    const SIGNED_WIRE: &[u8] = &[
        0x06, 0x16, // Data
        0x07, 0x03, 0x08, 0x01, b'a', // Name
        0x14, 0x00, // MetaInfo
        0x15, 0x02, b'h', b'i', // Content
        0x16, 0x03, 0x1B, 0x01, 0x00, // SignatureInfo
        0x17, 0x04, 0xAA, 0xAA, 0xAA, 0xAA, // SignatureValue
    ];

    #[test]
    fn test_encode() {
        let mut data = signed();
        assert_eq!(data.wire_encode().unwrap().as_ref(), SIGNED_WIRE);
        assert!(data.wire().is_some());
    }

    #[test]
    fn test_unsigned_cannot_encode() {
        let mut data = unsigned();
        assert_eq!(
            data.wire_encode().unwrap_err(),
            Error::from(PreconditionError::Unsigned)
        );

        let mut data = Data::new("/a".parse().unwrap());
        data.set_signature_value(vec![1]);
        assert_eq!(
            data.wire_encode().unwrap_err(),
            Error::from(PreconditionError::InvalidSignatureInfo)
        );
    }

    #[test]
    fn test_decode_roundtrip() {
        let data = Data::decode(Bytes::from_static(SIGNED_WIRE)).unwrap();
        assert_eq!(data, signed());
        assert_eq!(data.content_bytes().unwrap().as_ref(), b"hi");
        assert_eq!(data.signature_value().unwrap().as_ref(), &[0xAA; 4]);
        assert_eq!(data.wire().unwrap().as_ref(), SIGNED_WIRE);
    }

    #[test]
    fn test_decode_field_order() {
        // Content before MetaInfo
        let wire = [
            0x06, 0x0D, 0x07, 0x00, 0x15, 0x00, 0x14, 0x00, 0x16, 0x03, 0x1B, 0x01, 0x00, 0x17,
            0x00,
        ];
        assert_eq!(
            Data::decode(Bytes::copy_from_slice(&wire)),
            Err(DecodeError::OutOfOrder("MetaInfo"))
        );

        // Name not first
        let wire = [0x06, 0x04, 0x14, 0x00, 0x07, 0x00];
        assert_eq!(
            Data::decode(Bytes::copy_from_slice(&wire)),
            Err(DecodeError::Missing("Name"))
        );

        // SignatureValue missing
        let wire = [0x06, 0x07, 0x07, 0x00, 0x16, 0x03, 0x1B, 0x01, 0x00];
        assert_eq!(
            Data::decode(Bytes::copy_from_slice(&wire)),
            Err(DecodeError::Missing("SignatureValue"))
        );

        // SignatureInfo missing
        let wire = [0x06, 0x04, 0x07, 0x00, 0x17, 0x00];
        assert_eq!(
            Data::decode(Bytes::copy_from_slice(&wire)),
            Err(DecodeError::Missing("SignatureInfo"))
        );
    }

    #[test]
    fn test_decode_unknown_elements() {
        // non-critical 0x64 is skipped
        let wire = [
            0x06, 0x0B, 0x07, 0x00, 0x64, 0x00, 0x16, 0x03, 0x1B, 0x01, 0x00, 0x17, 0x00,
        ];
        assert!(Data::decode(Bytes::copy_from_slice(&wire)).is_ok());

        // critical 0x65 aborts
        let wire = [
            0x06, 0x0B, 0x07, 0x00, 0x65, 0x00, 0x16, 0x03, 0x1B, 0x01, 0x00, 0x17, 0x00,
        ];
        assert_eq!(
            Data::decode(Bytes::copy_from_slice(&wire)),
            Err(DecodeError::UnrecognizedCritical(0x65))
        );
    }

    #[test]
    fn test_full_name() {
        let mut data = signed();
        assert_eq!(data.full_name(), Err(Error::from(PreconditionError::NotEncoded)));

        let wire = data.wire_encode().unwrap();
        let full_name = data.full_name().unwrap();
        assert_eq!(full_name.len(), 2);
        assert!(full_name[1].is_implicit_sha256_digest());
        assert_eq!(full_name[1].value(), Sha256::digest(&wire).as_slice());

        data.set_freshness_period(Duration::from_secs(1));
        assert_eq!(data.full_name(), Err(Error::from(PreconditionError::NotEncoded)));
        data.wire_encode().unwrap();
        assert_ne!(data.full_name().unwrap(), full_name);
    }

    #[test]
    fn test_sign_then_finalize() {
        let mut data = unsigned();
        let buffer = data.encode_signed_portion().unwrap();
        assert_eq!(buffer.as_slice(), &SIGNED_WIRE[2..18]);

        let wire = data.finalize(buffer, vec![0xAA; 4]).unwrap();
        assert_eq!(wire.as_ref(), SIGNED_WIRE);
        assert_eq!(data, signed());
        assert!(data.full_name().is_ok());
    }

    #[test]
    fn test_extract_signed_ranges() {
        let unsigned_ranges = unsigned().extract_signed_ranges().unwrap();
        assert_eq!(unsigned_ranges.len(), 1);
        assert_eq!(unsigned_ranges[0].as_ref(), &SIGNED_WIRE[2..18]);

        let decoded = Data::decode(Bytes::from_static(SIGNED_WIRE)).unwrap();
        let ranges = decoded.extract_signed_ranges().unwrap();
        assert_eq!(ranges, unsigned_ranges);
    }

    #[test]
    fn test_set_content_wraps_foreign_block() {
        let mut data = Data::new(Name::new());
        data.set_content(Block::from_value(tlv::GENERIC_NAME_COMPONENT, &b"x"[..]));
        assert_eq!(data.content_bytes().unwrap().as_ref(), &[0x08, 0x01, b'x']);
        data.unset_content();
        assert!(!data.has_content());
    }

    #[test]
    fn test_display() {
        let text = signed().to_string();
        assert!(text.starts_with("Name: /a\n"));
        assert!(text.contains("Content: [2 bytes]"));
        assert!(text.ends_with("Signature: [type: DigestSha256, length: 4]\n"));
    }
}
