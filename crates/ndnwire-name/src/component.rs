//! Name components.

use bytes::Bytes;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use ndnwire_core::varnum::{decode_non_negative_integer, encode_non_negative_integer};
use ndnwire_core::{
    tlv, Block, ConstructionError, Convention, ConventionDecoding, Encoder, PreconditionError,
    UriFormat, WireConfig,
};

use crate::component_type::{ComponentType, DIGEST_LENGTH};
use crate::convention::NumberConvention;
use crate::escape::{escape_into, unescape};

/// One element of a [`Name`](crate::Name).
///
/// A component is a TLV block whose type lies in `[1, 65535]`. It always
/// carries its wire encoding, so cloning and slicing a name never copies
/// component bytes.
#[derive(Clone)]
pub struct Component {
    block: Block,
}

impl Component {
    /// Create a component, validating the type and value.
    pub fn new(tlv_type: u32, value: impl Into<Bytes>) -> Result<Self, ConstructionError> {
        let value = value.into();
        check(tlv_type, &value)?;
        Ok(Self::build(tlv_type, value))
    }

    /// A GenericNameComponent holding `value`.
    pub fn generic(value: impl Into<Bytes>) -> Self {
        Self::build(tlv::GENERIC_NAME_COMPONENT, value.into())
    }

    /// A KeywordNameComponent holding `value`.
    pub fn keyword(value: impl Into<Bytes>) -> Self {
        Self::build(tlv::KEYWORD_NAME_COMPONENT, value.into())
    }

    /// An ImplicitSha256DigestComponent.
    pub fn implicit_sha256_digest(digest: impl Into<Bytes>) -> Result<Self, ConstructionError> {
        Self::new(tlv::IMPLICIT_SHA256_DIGEST_COMPONENT, digest)
    }

    /// A ParametersSha256DigestComponent.
    pub fn parameters_sha256_digest(digest: impl Into<Bytes>) -> Result<Self, ConstructionError> {
        Self::new(tlv::PARAMETERS_SHA256_DIGEST_COMPONENT, digest)
    }

    /// An ImplicitSha256DigestComponent from a SHA-256 output.
    pub fn from_implicit_sha256_digest(digest: [u8; DIGEST_LENGTH]) -> Self {
        Self::build(
            tlv::IMPLICIT_SHA256_DIGEST_COMPONENT,
            Bytes::copy_from_slice(&digest),
        )
    }

    /// A ParametersSha256DigestComponent from a SHA-256 output.
    pub fn from_parameters_sha256_digest(digest: [u8; DIGEST_LENGTH]) -> Self {
        Self::build(
            tlv::PARAMETERS_SHA256_DIGEST_COMPONENT,
            Bytes::copy_from_slice(&digest),
        )
    }

    /// Wrap a block, validating it as a component.
    pub fn from_block(block: Block) -> Result<Self, ConstructionError> {
        check(block.tlv_type(), &block.value_bytes())?;
        let mut block = block;
        block.encode();
        Ok(Self { block })
    }

    /// The minimum component of a TLV-TYPE, e.g. an all-zero digest.
    pub fn min_of_type(tlv_type: u32) -> Result<Self, ConstructionError> {
        Self::new(tlv_type, ComponentType::of(tlv_type).min_value())
    }

    pub(crate) fn build(tlv_type: u32, value: Bytes) -> Self {
        let mut block = Block::from_value(tlv_type, value);
        block.encode();
        Self { block }
    }

    pub fn tlv_type(&self) -> u32 {
        self.block.tlv_type()
    }

    pub fn value(&self) -> &[u8] {
        self.block.value()
    }

    /// The value as a shared buffer.
    pub fn value_bytes(&self) -> Bytes {
        self.block.value_bytes()
    }

    /// Length of the value.
    pub fn value_size(&self) -> usize {
        self.block.value().len()
    }

    pub fn is_empty(&self) -> bool {
        self.value_size() == 0
    }

    /// The full TLV encoding.
    pub fn wire(&self) -> Bytes {
        self.block.to_wire()
    }

    /// Encoded size of the component.
    pub fn size(&self) -> usize {
        self.block.size()
    }

    pub fn as_block(&self) -> &Block {
        &self.block
    }

    /// Type rules for this component.
    pub fn component_type(&self) -> ComponentType {
        ComponentType::of(self.tlv_type())
    }

    /// Prepend the component to `encoder`.
    pub fn encode_to<E: Encoder>(&self, encoder: &mut E) -> usize {
        self.block.encode_to(encoder)
    }

    /// A copy backed by its own buffer.
    pub fn deep_copy(&self) -> Self {
        Self::build(self.tlv_type(), Bytes::copy_from_slice(self.value()))
    }

    pub fn is_generic(&self) -> bool {
        self.tlv_type() == tlv::GENERIC_NAME_COMPONENT
    }

    pub fn is_keyword(&self) -> bool {
        self.tlv_type() == tlv::KEYWORD_NAME_COMPONENT
    }

    pub fn is_implicit_sha256_digest(&self) -> bool {
        self.tlv_type() == tlv::IMPLICIT_SHA256_DIGEST_COMPONENT
    }

    pub fn is_parameters_sha256_digest(&self) -> bool {
        self.tlv_type() == tlv::PARAMETERS_SHA256_DIGEST_COMPONENT
    }

    /// Three-way canonical comparison: TLV-TYPE, then value length, then
    /// value bytes.
    pub fn compare(&self, other: &Component) -> Ordering {
        self.tlv_type()
            .cmp(&other.tlv_type())
            .then_with(|| self.value_size().cmp(&other.value_size()))
            .then_with(|| self.value().cmp(other.value()))
    }

    /// The next component in canonical order.
    pub fn successor(&self) -> Component {
        let (tlv_type, value) = self.component_type().successor(self.value());
        Self::build(tlv_type, value)
    }

    // Numbers

    /// A component of type `tlv_type` holding the nonNegativeInteger `n`.
    pub fn from_number(n: u64, tlv_type: u32) -> Result<Self, ConstructionError> {
        Self::new(tlv_type, encode_non_negative_integer(n))
    }

    /// A generic component holding `marker` followed by the nonNegativeInteger `n`.
    pub fn from_number_with_marker(marker: u8, n: u64) -> Self {
        let mut value = Vec::with_capacity(9);
        value.push(marker);
        value.extend_from_slice(&encode_non_negative_integer(n));
        Self::generic(value)
    }

    /// Whether the value is a valid nonNegativeInteger.
    pub fn is_number(&self) -> bool {
        matches!(self.value_size(), 1 | 2 | 4 | 8)
    }

    /// Whether the component is a generic one carrying `marker` and a number.
    pub fn is_number_with_marker(&self, marker: u8) -> bool {
        self.is_generic()
            && self.value().first() == Some(&marker)
            && matches!(self.value_size(), 2 | 3 | 5 | 9)
    }

    /// Interpret the value as a nonNegativeInteger.
    pub fn to_number(&self) -> Result<u64, PreconditionError> {
        decode_non_negative_integer(self.value())
            .map_err(|_| PreconditionError::NotConvention("nonNegativeInteger"))
    }

    /// Interpret a marker component's value after the marker.
    pub fn to_number_with_marker(&self, marker: u8) -> Result<u64, PreconditionError> {
        if !self.is_number_with_marker(marker) {
            return Err(PreconditionError::NotConvention("marker-prefixed number"));
        }
        decode_non_negative_integer(&self.value()[1..])
            .map_err(|_| PreconditionError::NotConvention("marker-prefixed number"))
    }

    // Naming conventions, explicit settings

    /// Encode `n` under `convention` with the given encoding.
    pub fn from_convention(convention: NumberConvention, n: u64, encoding: Convention) -> Self {
        match encoding {
            Convention::Marker => Self::from_number_with_marker(convention.marker(), n),
            Convention::Typed => Self::build(
                convention.tlv_type(),
                Bytes::from(encode_non_negative_integer(n)),
            ),
        }
    }

    /// Whether the component follows `convention` under the given acceptance.
    pub fn is_convention(&self, convention: NumberConvention, decoding: ConventionDecoding) -> bool {
        (decoding.accepts_marker() && self.is_number_with_marker(convention.marker()))
            || (decoding.accepts_typed()
                && self.tlv_type() == convention.tlv_type()
                && self.is_number())
    }

    /// Decode the number carried under `convention`.
    pub fn to_convention(
        &self,
        convention: NumberConvention,
        decoding: ConventionDecoding,
    ) -> Result<u64, PreconditionError> {
        if decoding.accepts_marker() && self.is_number_with_marker(convention.marker()) {
            return self.to_number_with_marker(convention.marker());
        }
        if decoding.accepts_typed() && self.tlv_type() == convention.tlv_type() && self.is_number() {
            return self.to_number();
        }
        Err(PreconditionError::NotConvention(convention.label()))
    }

    // Naming conventions, configured settings

    pub fn from_segment(n: u64) -> Self {
        Self::from_convention(NumberConvention::Segment, n, encoding())
    }

    pub fn is_segment(&self) -> bool {
        self.is_convention(NumberConvention::Segment, decoding())
    }

    pub fn to_segment(&self) -> Result<u64, PreconditionError> {
        self.to_convention(NumberConvention::Segment, decoding())
    }

    pub fn from_byte_offset(n: u64) -> Self {
        Self::from_convention(NumberConvention::ByteOffset, n, encoding())
    }

    pub fn is_byte_offset(&self) -> bool {
        self.is_convention(NumberConvention::ByteOffset, decoding())
    }

    pub fn to_byte_offset(&self) -> Result<u64, PreconditionError> {
        self.to_convention(NumberConvention::ByteOffset, decoding())
    }

    pub fn from_version(n: u64) -> Self {
        Self::from_convention(NumberConvention::Version, n, encoding())
    }

    pub fn is_version(&self) -> bool {
        self.is_convention(NumberConvention::Version, decoding())
    }

    pub fn to_version(&self) -> Result<u64, PreconditionError> {
        self.to_convention(NumberConvention::Version, decoding())
    }

    /// A timestamp component; `micros` counts microseconds since the Unix epoch.
    pub fn from_timestamp(micros: u64) -> Self {
        Self::from_convention(NumberConvention::Timestamp, micros, encoding())
    }

    pub fn is_timestamp(&self) -> bool {
        self.is_convention(NumberConvention::Timestamp, decoding())
    }

    /// Microseconds since the Unix epoch.
    pub fn to_timestamp(&self) -> Result<u64, PreconditionError> {
        self.to_convention(NumberConvention::Timestamp, decoding())
    }

    pub fn from_sequence_number(n: u64) -> Self {
        Self::from_convention(NumberConvention::SequenceNumber, n, encoding())
    }

    pub fn is_sequence_number(&self) -> bool {
        self.is_convention(NumberConvention::SequenceNumber, decoding())
    }

    pub fn to_sequence_number(&self) -> Result<u64, PreconditionError> {
        self.to_convention(NumberConvention::SequenceNumber, decoding())
    }

    // URI

    /// Render the component in URI form.
    pub fn to_uri(&self, format: UriFormat) -> String {
        let mut out = String::new();
        self.write_uri(&mut out, format);
        out
    }

    pub(crate) fn write_uri(&self, out: &mut String, format: UriFormat) {
        let component_type = self.component_type();
        if format.resolve() == UriFormat::Alternate {
            if component_type == ComponentType::Generic {
                self.write_escaped_value(out);
                return;
            }
            if let (Some(prefix), Some(value)) = (
                component_type.uri_prefix(),
                component_type.alternate_value(self.value()),
            ) {
                out.push_str(prefix);
                out.push('=');
                out.push_str(&value);
                return;
            }
        }
        out.push_str(&self.tlv_type().to_string());
        out.push('=');
        self.write_escaped_value(out);
    }

    fn write_escaped_value(&self, out: &mut String) {
        if self.value().iter().all(|&b| b == b'.') {
            out.push_str("...");
        }
        escape_into(self.value(), out);
    }

    /// Parse one component from its URI form.
    ///
    /// Accepts a plain escaped value (generic), `<type>=<escaped value>`, and
    /// alternate forms such as `seg=3` or `sha256digest=<hex>`.
    pub fn from_escaped_str(input: &str) -> Result<Self, ConstructionError> {
        let Some((prefix, rest)) = input.split_once('=') else {
            return Self::from_escaped_value(tlv::GENERIC_NAME_COMPONENT, input);
        };

        if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) {
            let tlv_type = prefix
                .parse::<u32>()
                .ok()
                .filter(|t| (tlv::NAME_COMPONENT_MIN..=tlv::NAME_COMPONENT_MAX).contains(t))
                .ok_or_else(|| {
                    ConstructionError::InvalidUri(format!("invalid TLV-TYPE '{prefix}' in NameComponent URI"))
                })?;
            return Self::from_escaped_value(tlv_type, rest);
        }

        let component_type = ComponentType::from_uri_prefix(prefix).ok_or_else(|| {
            ConstructionError::InvalidUri(format!("unknown TLV-TYPE '{prefix}' in NameComponent URI"))
        })?;
        let value = component_type.parse_alternate_value(rest)?;
        Self::new(component_type.tlv_type(), value)
    }

    fn from_escaped_value(tlv_type: u32, escaped: &str) -> Result<Self, ConstructionError> {
        let value = unescape(escaped);
        if value.iter().all(|&b| b == b'.') {
            if value.len() < 3 {
                return Err(ConstructionError::InvalidUri(
                    "name component cannot be . or ..".to_owned(),
                ));
            }
            return Self::new(tlv_type, Bytes::copy_from_slice(&value[3..]));
        }
        Self::new(tlv_type, value)
    }
}

fn check(tlv_type: u32, value: &[u8]) -> Result<(), ConstructionError> {
    if !(tlv::NAME_COMPONENT_MIN..=tlv::NAME_COMPONENT_MAX).contains(&tlv_type) {
        return Err(ConstructionError::InvalidComponentType(tlv_type));
    }
    ComponentType::of(tlv_type).check(value)
}

fn encoding() -> Convention {
    WireConfig::current().convention_encoding
}

fn decoding() -> ConventionDecoding {
    WireConfig::current().convention_decoding
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.tlv_type() == other.tlv_type() && self.value() == other.value()
    }
}

impl Eq for Component {}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for Component {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tlv_type().hash(state);
        self.value().hash(state);
    }
}

impl TryFrom<Block> for Component {
    type Error = ConstructionError;

    fn try_from(block: Block) -> Result<Self, Self::Error> {
        Self::from_block(block)
    }
}

impl From<Component> for Block {
    fn from(component: Component) -> Self {
        component.block
    }
}

impl FromStr for Component {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_escaped_str(s)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri(UriFormat::Default))
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.to_uri(UriFormat::Canonical))
    }
}
