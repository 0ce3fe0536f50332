//! KeyLocator: where to find the key that verifies a signature.

use bytes::Bytes;
use std::fmt;

use ndnwire_core::{tlv, Block, DecodeError, Encoder, PreconditionError};
use ndnwire_name::Name;

/// KeyLocator contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeyLocator {
    /// Present but empty.
    #[default]
    None,
    Name(Name),
    /// The KeyDigest block, kept as received.
    KeyDigest(Block),
    /// A nested element of an unrecognized TLV-TYPE.
    Unknown(u32),
}

impl KeyLocator {
    /// A KeyDigest locator holding `digest`.
    pub fn key_digest(digest: impl Into<Bytes>) -> Self {
        let mut block = Block::from_value(tlv::KEY_DIGEST, digest);
        block.encode();
        Self::KeyDigest(block)
    }

    /// The nested element's TLV-TYPE, or 0 if empty.
    pub fn locator_type(&self) -> u32 {
        match self {
            Self::None => tlv::INVALID,
            Self::Name(_) => tlv::NAME,
            Self::KeyDigest(_) => tlv::KEY_DIGEST,
            Self::Unknown(t) => *t,
        }
    }

    pub fn name(&self) -> Result<&Name, PreconditionError> {
        match self {
            Self::Name(name) => Ok(name),
            _ => Err(PreconditionError::KeyLocatorVariant("Name")),
        }
    }

    /// The KeyDigest value bytes.
    pub fn key_digest_value(&self) -> Result<Bytes, PreconditionError> {
        match self {
            Self::KeyDigest(block) => Ok(block.value_bytes()),
            _ => Err(PreconditionError::KeyLocatorVariant("KeyDigest")),
        }
    }

    /// Prepend the KeyLocator element.
    ///
    /// Fails for [`KeyLocator::Unknown`], which cannot be re-encoded.
    pub fn encode_to<E: Encoder>(&self, encoder: &mut E) -> Result<usize, PreconditionError> {
        let len = match self {
            Self::None => 0,
            Self::Name(name) => name.prepend_to(encoder),
            Self::KeyDigest(block) => block.encode_to(encoder),
            Self::Unknown(t) => return Err(PreconditionError::UnsupportedKeyLocator(*t)),
        };
        Ok(len + encoder.prepend_tl(tlv::KEY_LOCATOR, len))
    }

    /// Decode a KeyLocator element.
    pub fn wire_decode(block: &Block) -> Result<Self, DecodeError> {
        if block.tlv_type() != tlv::KEY_LOCATOR {
            return Err(DecodeError::UnexpectedType {
                expected: tlv::KEY_LOCATOR,
                actual: block.tlv_type(),
            });
        }
        let mut block = block.clone();
        block.parse()?;

        let Some(inner) = block.elements().first() else {
            return Ok(Self::None);
        };
        match inner.tlv_type() {
            tlv::NAME => Ok(Self::Name(Name::wire_decode(inner)?)),
            tlv::KEY_DIGEST => Ok(Self::KeyDigest(inner.clone())),
            other => {
                tracing::debug!(tlv_type = other, "KeyLocator holds an unrecognized element");
                Ok(Self::Unknown(other))
            }
        }
    }
}

impl From<Name> for KeyLocator {
    fn from(name: Name) -> Self {
        Self::Name(name)
    }
}

impl fmt::Display for KeyLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Name(name) => write!(f, "Name={name}"),
            Self::KeyDigest(block) => {
                let value = block.value_bytes();
                let shown = &value[..value.len().min(8)];
                write!(f, "KeyDigest={}", hex::encode_upper(shown))?;
                if value.len() > 8 {
                    write!(f, "...")?;
                }
                Ok(())
            }
            Self::Unknown(t) => write!(f, "Unknown({t})"),
        }
    }
}
