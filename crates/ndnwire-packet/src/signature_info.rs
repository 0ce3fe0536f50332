//! SignatureInfo and InterestSignatureInfo.

use bytes::Bytes;
use std::fmt;
use std::sync::OnceLock;

use ndnwire_core::varnum::decode_non_negative_integer;
use ndnwire_core::{
    tlv, Block, DecodeError, Encoder, EncodingBuffer, Estimator, PreconditionError,
};

use crate::key_locator::KeyLocator;
use crate::types::SignatureType;

/// Which element a SignatureInfo is encoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureInfoKind {
    /// SignatureInfo (22) inside Data.
    Data,
    /// InterestSignatureInfo (44) inside Interest parameters.
    Interest,
}

impl SignatureInfoKind {
    pub fn tlv_type(self) -> u32 {
        match self {
            Self::Data => tlv::SIGNATURE_INFO,
            Self::Interest => tlv::INTEREST_SIGNATURE_INFO,
        }
    }
}

/// Extension elements understood by name; any other critical type is
/// rejected on decode.
const KNOWN_EXTENSIONS: [u32; 4] = [
    tlv::VALIDITY_PERIOD,
    tlv::SIGNATURE_NONCE,
    tlv::SIGNATURE_TIME,
    tlv::SIGNATURE_SEQ_NUM,
];

/// Signature metadata: type, optional KeyLocator, extension elements.
///
/// A SignatureInfo without a signature type is invalid and cannot be
/// encoded. Extension elements keep the order in which their types were
/// first set.
///
/// The encoded value is cached until the next edit. Only the value is kept,
/// so one cache serves both element kinds.
#[derive(Debug, Clone, Default)]
pub struct SignatureInfo {
    signature_type: Option<SignatureType>,
    key_locator: Option<KeyLocator>,
    other_tlvs: Vec<Block>,
    value: OnceLock<Bytes>,
}

impl SignatureInfo {
    pub fn new(signature_type: SignatureType) -> Self {
        Self {
            signature_type: Some(signature_type),
            ..Default::default()
        }
    }

    pub fn with_key_locator(signature_type: SignatureType, key_locator: KeyLocator) -> Self {
        Self {
            signature_type: Some(signature_type),
            key_locator: Some(key_locator),
            ..Default::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.signature_type.is_some()
    }

    pub fn signature_type(&self) -> Option<SignatureType> {
        self.signature_type
    }

    pub fn set_signature_type(&mut self, signature_type: SignatureType) -> &mut Self {
        self.value.take();
        self.signature_type = Some(signature_type);
        self
    }

    pub fn key_locator(&self) -> Option<&KeyLocator> {
        self.key_locator.as_ref()
    }

    pub fn set_key_locator(&mut self, key_locator: Option<KeyLocator>) -> &mut Self {
        self.value.take();
        self.key_locator = key_locator;
        self
    }

    // Extension elements

    pub fn custom_tlv(&self, tlv_type: u32) -> Option<&Block> {
        self.other_tlvs.iter().find(|b| b.tlv_type() == tlv_type)
    }

    /// Set an extension element, replacing one of the same type in place.
    pub fn add_custom_tlv(&mut self, block: Block) -> &mut Self {
        self.value.take();
        match self
            .other_tlvs
            .iter_mut()
            .find(|b| b.tlv_type() == block.tlv_type())
        {
            Some(existing) => *existing = block,
            None => self.other_tlvs.push(block),
        }
        self
    }

    pub fn remove_custom_tlv(&mut self, tlv_type: u32) -> &mut Self {
        self.value.take();
        self.other_tlvs.retain(|b| b.tlv_type() != tlv_type);
        self
    }

    pub fn custom_tlvs(&self) -> &[Block] {
        &self.other_tlvs
    }

    pub fn nonce(&self) -> Option<Bytes> {
        self.custom_tlv(tlv::SIGNATURE_NONCE).map(Block::value_bytes)
    }

    pub fn set_nonce(&mut self, nonce: Option<Bytes>) -> &mut Self {
        match nonce {
            Some(nonce) => self.add_custom_tlv(Block::from_value(tlv::SIGNATURE_NONCE, nonce)),
            None => self.remove_custom_tlv(tlv::SIGNATURE_NONCE),
        }
    }

    /// SignatureTime in milliseconds since the Unix epoch.
    pub fn time(&self) -> Option<Result<u64, DecodeError>> {
        self.custom_tlv(tlv::SIGNATURE_TIME)
            .map(Block::read_non_negative_integer)
    }

    pub fn set_time(&mut self, millis: Option<u64>) -> &mut Self {
        match millis {
            Some(ms) => self.add_custom_tlv(Block::from_non_negative_integer(tlv::SIGNATURE_TIME, ms)),
            None => self.remove_custom_tlv(tlv::SIGNATURE_TIME),
        }
    }

    pub fn seq_num(&self) -> Option<Result<u64, DecodeError>> {
        self.custom_tlv(tlv::SIGNATURE_SEQ_NUM)
            .map(Block::read_non_negative_integer)
    }

    pub fn set_seq_num(&mut self, seq_num: Option<u64>) -> &mut Self {
        match seq_num {
            Some(n) => self.add_custom_tlv(Block::from_non_negative_integer(tlv::SIGNATURE_SEQ_NUM, n)),
            None => self.remove_custom_tlv(tlv::SIGNATURE_SEQ_NUM),
        }
    }

    // Encoding

    /// Prepend the element as `kind`.
    pub fn encode_to<E: Encoder>(
        &self,
        encoder: &mut E,
        kind: SignatureInfoKind,
    ) -> Result<usize, PreconditionError> {
        let len = encoder.prepend_bytes(&self.encoded_value()?);
        Ok(len + encoder.prepend_tl(kind.tlv_type(), len))
    }

    /// The encoded TLV-VALUE, built at most once per edit.
    pub fn encoded_value(&self) -> Result<Bytes, PreconditionError> {
        if let Some(value) = self.value.get() {
            return Ok(value.clone());
        }
        let mut estimator = Estimator::new();
        let size = self.prepend_fields_to(&mut estimator)?;
        let mut buffer = EncodingBuffer::with_capacity(size);
        self.prepend_fields_to(&mut buffer)?;
        let value = buffer.into_bytes();
        Ok(self.value.get_or_init(|| value).clone())
    }

    pub fn has_wire(&self) -> bool {
        self.value.get().is_some()
    }

    fn prepend_fields_to<E: Encoder>(&self, encoder: &mut E) -> Result<usize, PreconditionError> {
        let signature_type = self
            .signature_type
            .ok_or(PreconditionError::InvalidSignatureInfo)?;

        let mut len = 0;
        for block in self.other_tlvs.iter().rev() {
            len += block.encode_to(encoder);
        }
        if let Some(key_locator) = &self.key_locator {
            len += key_locator.encode_to(encoder)?;
        }
        len += encoder.prepend_non_negative_integer_block(tlv::SIGNATURE_TYPE, signature_type.code());
        Ok(len)
    }

    /// The element as an encoded block.
    pub fn to_block(&self, kind: SignatureInfoKind) -> Result<Block, PreconditionError> {
        let mut estimator = Estimator::new();
        let size = self.encode_to(&mut estimator, kind)?;
        let mut buffer = EncodingBuffer::with_capacity(size);
        self.encode_to(&mut buffer, kind)?;
        Block::decode(buffer.into_bytes()).map_err(|_| PreconditionError::InvalidSignatureInfo)
    }

    /// Decode a SignatureInfo or InterestSignatureInfo element.
    pub fn wire_decode(block: &Block) -> Result<Self, DecodeError> {
        if block.tlv_type() != tlv::SIGNATURE_INFO && block.tlv_type() != tlv::INTEREST_SIGNATURE_INFO {
            return Err(DecodeError::UnexpectedType {
                expected: tlv::SIGNATURE_INFO,
                actual: block.tlv_type(),
            });
        }
        let mut block = block.clone();
        block.parse()?;
        let mut elements = block.elements().iter();

        let signature_type = match elements.next() {
            Some(e) if e.tlv_type() == tlv::SIGNATURE_TYPE => {
                SignatureType(decode_non_negative_integer(e.value())?)
            }
            _ => return Err(DecodeError::Missing("SignatureType")),
        };

        let mut info = Self::new(signature_type);
        let mut rest = elements.peekable();
        if let Some(e) = rest.next_if(|e| e.tlv_type() == tlv::KEY_LOCATOR) {
            info.key_locator = Some(KeyLocator::wire_decode(e)?);
        }

        for element in rest {
            let t = element.tlv_type();
            if t == tlv::SIGNATURE_TYPE || t == tlv::KEY_LOCATOR {
                return Err(DecodeError::OutOfOrder(if t == tlv::SIGNATURE_TYPE {
                    "SignatureType"
                } else {
                    "KeyLocator"
                }));
            }
            if tlv::is_critical_type(t) && !KNOWN_EXTENSIONS.contains(&t) {
                return Err(DecodeError::UnrecognizedCritical(t));
            }
            info.other_tlvs.push(element.clone());
        }
        info.value = OnceLock::from(block.value_bytes());
        Ok(info)
    }
}

impl PartialEq for SignatureInfo {
    fn eq(&self, other: &Self) -> bool {
        self.signature_type == other.signature_type
            && self.key_locator == other.key_locator
            && self.other_tlvs == other.other_tlvs
    }
}

impl Eq for SignatureInfo {}

impl fmt::Display for SignatureInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(signature_type) = self.signature_type else {
            return write!(f, "Invalid SignatureInfo");
        };
        write!(f, "{signature_type}")?;
        if let Some(key_locator) = &self.key_locator {
            write!(f, " {key_locator}")?;
        }
        if !self.other_tlvs.is_empty() {
            write!(f, " {{ ")?;
            for block in &self.other_tlvs {
                write!(f, "{} ", block.tlv_type())?;
            }
            write!(f, "}}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_encoding() {
        let info = SignatureInfo::new(SignatureType::DIGEST_SHA256);
        let block = info.to_block(SignatureInfoKind::Data).unwrap();
        assert_eq!(block.to_wire().as_ref(), &[0x16, 0x03, 0x1B, 0x01, 0x00]);

        let block = info.to_block(SignatureInfoKind::Interest).unwrap();
        assert_eq!(block.to_wire().as_ref(), &[0x2C, 0x03, 0x1B, 0x01, 0x00]);
    }

    #[test]
    fn test_decoded_value_is_reused_until_edited() {
        let buf = Bytes::from_static(&[0x16, 0x06, 0x1B, 0x01, 0x05, 0x28, 0x01, 0x07]);
        let block = Block::decode(buf.clone()).unwrap();
        let mut info = SignatureInfo::wire_decode(&block).unwrap();
        assert!(info.has_wire());
        assert_eq!(info.encoded_value().unwrap().as_ptr(), block.value().as_ptr());
        assert_eq!(info.to_block(SignatureInfoKind::Data).unwrap().to_wire(), buf);
        assert_eq!(
            info.to_block(SignatureInfoKind::Interest).unwrap().to_wire().as_ref(),
            &[0x2C, 0x06, 0x1B, 0x01, 0x05, 0x28, 0x01, 0x07]
        );

        info.set_seq_num(Some(8));
        assert!(!info.has_wire());
        assert_eq!(
            info.encoded_value().unwrap().as_ref(),
            &[0x1B, 0x01, 0x05, 0x28, 0x01, 0x07, 0x2A, 0x01, 0x08]
        );
    }

    #[test]
    fn test_invalid_cannot_encode() {
        let info = SignatureInfo::default();
        assert!(!info.is_valid());
        assert_eq!(
            info.to_block(SignatureInfoKind::Data),
            Err(PreconditionError::InvalidSignatureInfo)
        );
        assert_eq!(info.to_string(), "Invalid SignatureInfo");
    }

    #[test]
    fn test_roundtrip_with_extensions() {
        let mut info = SignatureInfo::with_key_locator(
            SignatureType::ED25519,
            KeyLocator::Name("/key".parse().unwrap()),
        );
        info.set_nonce(Some(Bytes::from_static(&[1, 2, 3])))
            .set_time(Some(1_700_000_000_000))
            .set_seq_num(Some(7));

        let block = info.to_block(SignatureInfoKind::Interest).unwrap();
        let decoded = SignatureInfo::wire_decode(&block).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.nonce().unwrap().as_ref(), &[1, 2, 3]);
        assert_eq!(decoded.time(), Some(Ok(1_700_000_000_000)));
        assert_eq!(decoded.seq_num(), Some(Ok(7)));
    }

    #[test]
    fn test_extension_order_survives_replacement() {
        let mut info = SignatureInfo::new(SignatureType::ED25519);
        info.set_seq_num(Some(1)).set_nonce(Some(Bytes::from_static(b"n")));
        info.set_seq_num(Some(2));
        let types: Vec<u32> = info.custom_tlvs().iter().map(Block::tlv_type).collect();
        assert_eq!(types, vec![tlv::SIGNATURE_SEQ_NUM, tlv::SIGNATURE_NONCE]);

        info.set_time(Some(5));
        let types: Vec<u32> = info.custom_tlvs().iter().map(Block::tlv_type).collect();
        assert_eq!(
            types,
            vec![tlv::SIGNATURE_SEQ_NUM, tlv::SIGNATURE_NONCE, tlv::SIGNATURE_TIME]
        );

        info.set_nonce(None);
        assert!(info.nonce().is_none());
        assert_eq!(info.to_string(), "SignatureEd25519 { 42 40 }");
    }

    #[test]
    fn test_decode_errors() {
        // KeyLocator before SignatureType
        let block = Block::from_slice(&[0x16, 0x05, 0x1C, 0x00, 0x1B, 0x01, 0x00]).unwrap();
        assert_eq!(
            SignatureInfo::wire_decode(&block),
            Err(DecodeError::Missing("SignatureType"))
        );

        // unknown critical extension
        let block = Block::from_slice(&[0x16, 0x05, 0x1B, 0x01, 0x00, 0x21, 0x00]).unwrap();
        assert_eq!(
            SignatureInfo::wire_decode(&block),
            Err(DecodeError::UnrecognizedCritical(33))
        );

        // unknown non-critical extension is kept
        let block = Block::from_slice(&[0x16, 0x05, 0x1B, 0x01, 0x00, 0x64, 0x00]).unwrap();
        let info = SignatureInfo::wire_decode(&block).unwrap();
        assert!(info.custom_tlv(100).is_some());

        let block = Block::from_slice(&[0x15, 0x00]).unwrap();
        assert!(matches!(
            SignatureInfo::wire_decode(&block),
            Err(DecodeError::UnexpectedType { .. })
        ));
    }

    #[test]
    fn test_display() {
        let info = SignatureInfo::with_key_locator(
            SignatureType::SHA256_WITH_ECDSA,
            KeyLocator::Name("/k".parse().unwrap()),
        );
        assert_eq!(info.to_string(), "SignatureSha256WithEcdsa Name=/k");
    }
}
