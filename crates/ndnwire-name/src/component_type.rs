//! Per-TLV-TYPE rules for name components.
//!
//! A component's TLV-TYPE decides how its value is validated, whether it has
//! an alternate URI form, and how its successor behaves on overflow.

use bytes::Bytes;
use ndnwire_core::varnum::{decode_non_negative_integer, encode_non_negative_integer};
use ndnwire_core::{tlv, ConstructionError};

use crate::convention::NumberConvention;

/// Length of a SHA-256 digest component value.
pub const DIGEST_LENGTH: usize = 32;

const ZERO_DIGEST: [u8; DIGEST_LENGTH] = [0; DIGEST_LENGTH];

/// Component type rules, looked up by TLV-TYPE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    ImplicitSha256Digest,
    ParametersSha256Digest,
    Generic,
    Keyword,
    Number(NumberConvention),
    Other(u32),
}

impl ComponentType {
    /// Rules for `tlv_type`.
    pub fn of(tlv_type: u32) -> Self {
        match tlv_type {
            tlv::IMPLICIT_SHA256_DIGEST_COMPONENT => Self::ImplicitSha256Digest,
            tlv::PARAMETERS_SHA256_DIGEST_COMPONENT => Self::ParametersSha256Digest,
            tlv::GENERIC_NAME_COMPONENT => Self::Generic,
            tlv::KEYWORD_NAME_COMPONENT => Self::Keyword,
            other => match NumberConvention::from_tlv_type(other) {
                Some(convention) => Self::Number(convention),
                None => Self::Other(other),
            },
        }
    }

    /// Rules for an alternate URI prefix such as `sha256digest` or `seg`.
    pub fn from_uri_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "sha256digest" => Some(Self::ImplicitSha256Digest),
            "params-sha256" => Some(Self::ParametersSha256Digest),
            _ => NumberConvention::from_uri_prefix(prefix).map(Self::Number),
        }
    }

    pub fn tlv_type(self) -> u32 {
        match self {
            Self::ImplicitSha256Digest => tlv::IMPLICIT_SHA256_DIGEST_COMPONENT,
            Self::ParametersSha256Digest => tlv::PARAMETERS_SHA256_DIGEST_COMPONENT,
            Self::Generic => tlv::GENERIC_NAME_COMPONENT,
            Self::Keyword => tlv::KEYWORD_NAME_COMPONENT,
            Self::Number(convention) => convention.tlv_type(),
            Self::Other(tlv_type) => tlv_type,
        }
    }

    fn digest_kind(self) -> Option<&'static str> {
        match self {
            Self::ImplicitSha256Digest => Some("ImplicitSha256DigestComponent"),
            Self::ParametersSha256Digest => Some("ParametersSha256DigestComponent"),
            _ => None,
        }
    }

    /// Whether values of this type have a fixed length.
    pub fn is_fixed_length(self) -> bool {
        self.digest_kind().is_some()
    }

    /// Validate a value for this type.
    pub fn check(self, value: &[u8]) -> Result<(), ConstructionError> {
        match self.digest_kind() {
            Some(kind) if value.len() != DIGEST_LENGTH => Err(ConstructionError::DigestLength {
                kind,
                expected: DIGEST_LENGTH,
                actual: value.len(),
            }),
            _ => Ok(()),
        }
    }

    /// The smallest value of this type.
    pub fn min_value(self) -> Bytes {
        if self.is_fixed_length() {
            Bytes::from_static(&ZERO_DIGEST)
        } else {
            Bytes::new()
        }
    }

    /// Alternate URI prefix, if the type has one.
    pub fn uri_prefix(self) -> Option<&'static str> {
        match self {
            Self::ImplicitSha256Digest => Some("sha256digest"),
            Self::ParametersSha256Digest => Some("params-sha256"),
            Self::Number(convention) => Some(convention.uri_prefix()),
            _ => None,
        }
    }

    /// The alternate URI rendering of `value`, or `None` to fall back to the
    /// canonical form.
    pub fn alternate_value(self, value: &[u8]) -> Option<String> {
        match self {
            Self::ImplicitSha256Digest | Self::ParametersSha256Digest => Some(hex::encode(value)),
            Self::Number(_) => decode_non_negative_integer(value)
                .ok()
                .map(|n| n.to_string()),
            _ => None,
        }
    }

    /// Parse the text after an alternate URI prefix.
    pub fn parse_alternate_value(self, text: &str) -> Result<Bytes, ConstructionError> {
        match self {
            Self::ImplicitSha256Digest | Self::ParametersSha256Digest => {
                let value = hex::decode(text).map_err(|e| {
                    ConstructionError::InvalidUri(format!("cannot convert to {}: {e}", self.prefix_or_type()))
                })?;
                self.check(&value)?;
                Ok(Bytes::from(value))
            }
            Self::Number(convention) => {
                if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ConstructionError::InvalidUri(format!(
                        "cannot convert '{text}' to {}",
                        convention.label()
                    )));
                }
                let n: u64 = text.parse().map_err(|_| {
                    ConstructionError::InvalidUri(format!("{} '{text}' is out of range", convention.label()))
                })?;
                Ok(Bytes::from(encode_non_negative_integer(n)))
            }
            _ => Err(ConstructionError::InvalidUri(format!(
                "TLV-TYPE {} has no alternate URI form",
                self.tlv_type()
            ))),
        }
    }

    fn prefix_or_type(self) -> String {
        self.uri_prefix()
            .map(str::to_owned)
            .unwrap_or_else(|| self.tlv_type().to_string())
    }

    /// Next value in canonical order, as `(tlv_type, value)`.
    ///
    /// The value is incremented as a big-endian number. When every byte
    /// overflows, fixed-length types move to the next TLV-TYPE's minimum
    /// value and variable-length types grow by one zero byte.
    pub fn successor(self, value: &[u8]) -> (u32, Bytes) {
        let mut next = value.to_vec();
        let mut overflow = true;
        for byte in next.iter_mut().rev() {
            *byte = byte.wrapping_add(1);
            if *byte != 0 {
                overflow = false;
                break;
            }
        }

        if !overflow {
            return (self.tlv_type(), Bytes::from(next));
        }
        if self.is_fixed_length() {
            let next_type = self.tlv_type() + 1;
            return (next_type, ComponentType::of(next_type).min_value());
        }
        next.push(0);
        (self.tlv_type(), Bytes::from(next))
    }
}
