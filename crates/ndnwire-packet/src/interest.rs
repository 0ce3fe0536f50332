//! Interest packets.
//!
//! ```text
//! Interest = INTEREST-TYPE TLV-LENGTH
//!              Name
//!              [CanBePrefix]
//!              [MustBeFresh]
//!              [ForwardingHint]
//!              [Nonce]
//!              [InterestLifetime]
//!              [HopLimit]
//!              [ApplicationParameters [InterestSignatureInfo InterestSignatureValue]]
//! ```
//!
//! Everything from ApplicationParameters on is kept as an ordered list of
//! parameter blocks. While that list is non-empty, the name carries exactly
//! one ParametersSha256DigestComponent holding the SHA-256 of the
//! concatenated parameter blocks; the setters below keep it up to date.

use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;

use ndnwire_core::{
    tlv, Block, ConstructionError, DecodeError, Encoder, PreconditionError, Result, TlvEncode,
    WireConfig,
};
use ndnwire_name::{Component, Name};

use crate::data::Data;
use crate::signature_info::{SignatureInfo, SignatureInfoKind};
use crate::types::Nonce;

/// InterestLifetime assumed when the element is absent.
pub const DEFAULT_INTEREST_LIFETIME: Duration = Duration::from_millis(4000);

/// An Interest packet.
#[derive(Debug, Clone)]
pub struct Interest {
    name: Name,
    can_be_prefix: bool,
    must_be_fresh: bool,
    forwarding_hint: Vec<Name>,
    nonce: Option<Nonce>,
    lifetime: Duration,
    hop_limit: Option<u8>,
    parameters: Vec<Block>,
    wire: Option<Bytes>,
}

impl Default for Interest {
    fn default() -> Self {
        Self {
            name: Name::new(),
            can_be_prefix: false,
            must_be_fresh: false,
            forwarding_hint: Vec::new(),
            nonce: None,
            lifetime: DEFAULT_INTEREST_LIFETIME,
            hop_limit: None,
            parameters: Vec::new(),
            wire: None,
        }
    }
}

impl Interest {
    /// An Interest for `name`.
    ///
    /// Fails if the name has more than one ParametersSha256DigestComponent.
    pub fn new(name: Name) -> std::result::Result<Self, ConstructionError> {
        let mut interest = Self::default();
        interest.set_name(name)?;
        Ok(interest)
    }

    // Decoding

    /// Decode a buffer holding exactly one Interest element.
    pub fn decode(wire: Bytes) -> std::result::Result<Self, DecodeError> {
        Self::wire_decode(&Block::decode(wire)?)
    }

    /// Decode an Interest element, checking the parameters digest if the
    /// installed [`WireConfig`] asks for it.
    pub fn wire_decode(block: &Block) -> std::result::Result<Self, DecodeError> {
        Self::wire_decode_with(block, WireConfig::current().auto_check_parameters_digest)
    }

    /// Decode an Interest element with an explicit digest-check setting.
    pub fn wire_decode_with(
        block: &Block,
        check_parameters_digest: bool,
    ) -> std::result::Result<Self, DecodeError> {
        if block.tlv_type() != tlv::INTEREST {
            return Err(DecodeError::UnexpectedType {
                expected: tlv::INTEREST,
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
        if name.count_parameters_digests() > 1 {
            return Err(ConstructionError::MultipleParametersDigests.into());
        }
        let mut interest = Self {
            name,
            ..Default::default()
        };

        let mut last_element = 1;
        for element in elements {
            match element.tlv_type() {
                tlv::CAN_BE_PREFIX => {
                    check_order(&mut last_element, 2, "CanBePrefix")?;
                    check_empty(element, "CanBePrefix")?;
                    interest.can_be_prefix = true;
                }
                tlv::MUST_BE_FRESH => {
                    check_order(&mut last_element, 3, "MustBeFresh")?;
                    check_empty(element, "MustBeFresh")?;
                    interest.must_be_fresh = true;
                }
                tlv::FORWARDING_HINT => {
                    check_order(&mut last_element, 4, "ForwardingHint")?;
                    interest.forwarding_hint = decode_forwarding_hint(element)?;
                }
                tlv::NONCE => {
                    check_order(&mut last_element, 5, "Nonce")?;
                    let nonce = Nonce::try_from(element.value())
                        .map_err(|_| DecodeError::malformed("Nonce", "TLV-LENGTH must be 4"))?;
                    interest.nonce = Some(nonce);
                }
                tlv::INTEREST_LIFETIME => {
                    check_order(&mut last_element, 6, "InterestLifetime")?;
                    interest.lifetime = Duration::from_millis(element.read_non_negative_integer()?);
                }
                tlv::HOP_LIMIT => {
                    if last_element >= 7 {
                        tracing::trace!("ignoring out-of-order or repeated HopLimit");
                        continue;
                    }
                    let [hop_limit] = element.value() else {
                        return Err(DecodeError::malformed("HopLimit", "TLV-LENGTH must be 1"));
                    };
                    interest.hop_limit = Some(*hop_limit);
                    last_element = 7;
                }
                tlv::APPLICATION_PARAMETERS => {
                    if last_element >= 8 {
                        tracing::trace!("ignoring out-of-order or repeated ApplicationParameters");
                        continue;
                    }
                    interest.parameters.push(element.clone());
                    last_element = 8;
                }
                other if tlv::is_critical_type(other) => {
                    return Err(DecodeError::UnrecognizedCritical(other));
                }
                other => {
                    if interest.has_application_parameters() {
                        tracing::trace!(tlv_type = other, "keeping non-critical element as a parameter");
                        interest.parameters.push(element.clone());
                    } else {
                        tracing::trace!(tlv_type = other, "dropping non-critical element in Interest");
                    }
                }
            }
        }

        if check_parameters_digest {
            if !interest.is_parameters_digest_valid() {
                return Err(DecodeError::ParametersDigestMismatch);
            }
        } else {
            tracing::debug!("ParametersSha256DigestComponent check disabled");
        }

        interest.wire = Some(block.to_wire());
        Ok(interest)
    }

    // Encoding

    /// Encode, caching the wire.
    pub fn wire_encode(&mut self) -> Result<Bytes> {
        if let Some(wire) = &self.wire {
            return Ok(wire.clone());
        }
        let wire = self.encode_to_bytes()?;
        self.wire = Some(wire.clone());
        Ok(wire)
    }

    /// The cached wire encoding, if any.
    pub fn wire(&self) -> Option<&Bytes> {
        self.wire.as_ref()
    }

    fn prepend_value_to<E: Encoder>(&self, encoder: &mut E) -> usize {
        let mut len = 0;
        for block in self.parameters.iter().rev() {
            len += block.encode_to(encoder);
        }
        if let Some(hop_limit) = self.hop_limit {
            len += encoder.prepend_byte_array_block(tlv::HOP_LIMIT, &[hop_limit]);
        }
        if self.lifetime != DEFAULT_INTEREST_LIFETIME {
            len += encoder.prepend_non_negative_integer_block(
                tlv::INTEREST_LIFETIME,
                self.lifetime.as_millis() as u64,
            );
        }
        if let Some(nonce) = &self.nonce {
            len += encoder.prepend_byte_array_block(tlv::NONCE, nonce.as_bytes());
        }
        if !self.forwarding_hint.is_empty() {
            len += encoder.prepend_nested(tlv::FORWARDING_HINT, |e| {
                self.forwarding_hint
                    .iter()
                    .rev()
                    .map(|name| name.prepend_to(e))
                    .sum()
            });
        }
        if self.must_be_fresh {
            len += encoder.prepend_empty_block(tlv::MUST_BE_FRESH);
        }
        if self.can_be_prefix {
            len += encoder.prepend_empty_block(tlv::CAN_BE_PREFIX);
        }
        len + self.name.prepend_to(encoder)
    }

    fn reset_wire(&mut self) {
        self.wire = None;
    }

    // Name

    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Replace the name.
    ///
    /// Only the number of ParametersSha256DigestComponents is checked. If
    /// the Interest has parameters, the digest component is added or
    /// refreshed.
    pub fn set_name(&mut self, name: Name) -> std::result::Result<&mut Self, ConstructionError> {
        if name.count_parameters_digests() > 1 {
            return Err(ConstructionError::MultipleParametersDigests);
        }
        if name != self.name {
            self.name = name;
            if self.has_application_parameters() {
                self.add_or_replace_parameters_digest();
            }
            self.reset_wire();
        }
        Ok(self)
    }

    // Selectors and guiders

    pub fn can_be_prefix(&self) -> bool {
        self.can_be_prefix
    }

    pub fn set_can_be_prefix(&mut self, can_be_prefix: bool) -> &mut Self {
        if self.can_be_prefix != can_be_prefix {
            self.can_be_prefix = can_be_prefix;
            self.reset_wire();
        }
        self
    }

    pub fn must_be_fresh(&self) -> bool {
        self.must_be_fresh
    }

    pub fn set_must_be_fresh(&mut self, must_be_fresh: bool) -> &mut Self {
        if self.must_be_fresh != must_be_fresh {
            self.must_be_fresh = must_be_fresh;
            self.reset_wire();
        }
        self
    }

    pub fn forwarding_hint(&self) -> &[Name] {
        &self.forwarding_hint
    }

    pub fn set_forwarding_hint(&mut self, hint: Vec<Name>) -> &mut Self {
        self.forwarding_hint = hint;
        self.reset_wire();
        self
    }

    pub fn nonce(&self) -> Option<Nonce> {
        self.nonce
    }

    pub fn set_nonce(&mut self, nonce: Option<Nonce>) -> &mut Self {
        if self.nonce != nonce {
            self.nonce = nonce;
            self.reset_wire();
        }
        self
    }

    /// Replace an existing nonce with a different random one; no-op if unset.
    pub fn refresh_nonce(&mut self) -> &mut Self {
        let Some(old) = self.nonce else {
            return self;
        };
        let mut fresh = Nonce::random();
        while fresh == old {
            fresh = Nonce::random();
        }
        self.set_nonce(Some(fresh))
    }

    pub fn interest_lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn set_interest_lifetime(&mut self, lifetime: Duration) -> &mut Self {
        if self.lifetime != lifetime {
            self.lifetime = lifetime;
            self.reset_wire();
        }
        self
    }

    pub fn hop_limit(&self) -> Option<u8> {
        self.hop_limit
    }

    pub fn set_hop_limit(&mut self, hop_limit: Option<u8>) -> &mut Self {
        if self.hop_limit != hop_limit {
            self.hop_limit = hop_limit;
            self.reset_wire();
        }
        self
    }

    // Parameters

    /// ApplicationParameters and every parameter block after it.
    pub fn parameters(&self) -> &[Block] {
        &self.parameters
    }

    pub fn has_application_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    pub fn application_parameters(&self) -> Option<&Block> {
        self.parameters.first()
    }

    /// Set ApplicationParameters and update the digest component.
    ///
    /// A block of another type is wrapped in an ApplicationParameters
    /// element.
    pub fn set_application_parameters(
        &mut self,
        block: Block,
    ) -> std::result::Result<&mut Self, ConstructionError> {
        if !block.is_valid() {
            return Err(ConstructionError::InvalidBlock("ApplicationParameters"));
        }
        let mut block = if block.tlv_type() == tlv::APPLICATION_PARAMETERS {
            block
        } else {
            Block::nested(tlv::APPLICATION_PARAMETERS, vec![block])
        };
        block.encode();

        match self.parameters.first_mut() {
            Some(first) => *first = block,
            None => self.parameters.push(block),
        }
        self.add_or_replace_parameters_digest();
        self.reset_wire();
        Ok(self)
    }

    /// Set ApplicationParameters from raw bytes.
    pub fn set_application_parameters_bytes(&mut self, value: impl Into<Bytes>) -> &mut Self {
        let mut block = Block::from_value(tlv::APPLICATION_PARAMETERS, value);
        block.encode();
        match self.parameters.first_mut() {
            Some(first) => *first = block,
            None => self.parameters.push(block),
        }
        self.add_or_replace_parameters_digest();
        self.reset_wire();
        self
    }

    /// Remove every parameter block, including any signature, and the
    /// digest component.
    pub fn unset_application_parameters(&mut self) -> &mut Self {
        self.parameters.clear();
        if let Some(i) = self.name.parameters_digest_index() {
            let mut components = self.name.components().to_vec();
            components.remove(i);
            self.name = Name::from_components(components);
        }
        self.reset_wire();
        self
    }

    /// Whether the digest component agrees with the parameters.
    ///
    /// Without parameters, the name must not contain a digest component;
    /// with them, it must contain exactly one, holding their SHA-256.
    pub fn is_parameters_digest_valid(&self) -> bool {
        match (self.name.count_parameters_digests(), self.name.parameters_digest_index()) {
            (0, _) => !self.has_application_parameters(),
            (1, Some(i)) => {
                self.has_application_parameters()
                    && self.name[i].value() == self.compute_parameters_digest().as_slice()
            }
            _ => false,
        }
    }

    fn compute_parameters_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for block in &self.parameters {
            hasher.update(block.to_wire());
        }
        hasher.finalize().into()
    }

    fn add_or_replace_parameters_digest(&mut self) {
        let digest = Component::from_parameters_sha256_digest(self.compute_parameters_digest());
        let mut components = self.name.components().to_vec();
        match self.name.parameters_digest_index() {
            Some(i) => components[i] = digest,
            None => components.push(digest),
        }
        self.name = Name::from_components(components);
    }

    // Signature

    /// The decoded InterestSignatureInfo, if present and well-formed.
    pub fn signature_info(&self) -> Option<SignatureInfo> {
        let block = self.find_parameter(tlv::INTEREST_SIGNATURE_INFO)?;
        match SignatureInfo::wire_decode(block) {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::debug!(error = %e, "InterestSignatureInfo is malformed");
                None
            }
        }
    }

    /// Set InterestSignatureInfo, inserting empty ApplicationParameters
    /// if needed, and update the digest component.
    pub fn set_signature_info(&mut self, info: &SignatureInfo) -> Result<&mut Self> {
        let encoded = info.to_block(SignatureInfoKind::Interest)?;

        if self.parameters.is_empty() {
            self.parameters.push(Block::new(tlv::APPLICATION_PARAMETERS));
        }
        match self.parameter_index(tlv::INTEREST_SIGNATURE_INFO) {
            Some(i) => self.parameters[i] = encoded,
            None => {
                let at = self
                    .parameter_index(tlv::INTEREST_SIGNATURE_VALUE)
                    .unwrap_or(self.parameters.len());
                self.parameters.insert(at, encoded);
            }
        }
        self.add_or_replace_parameters_digest();
        self.reset_wire();
        Ok(self)
    }

    /// The InterestSignatureValue bytes.
    pub fn signature_value(&self) -> Option<Bytes> {
        self.find_parameter(tlv::INTEREST_SIGNATURE_VALUE)
            .map(Block::value_bytes)
    }

    /// Set InterestSignatureValue and update the digest component.
    ///
    /// InterestSignatureInfo must already be set.
    pub fn set_signature_value(&mut self, value: impl Into<Bytes>) -> Result<&mut Self> {
        let info_index = self
            .parameter_index(tlv::INTEREST_SIGNATURE_INFO)
            .ok_or(PreconditionError::SignatureInfoRequired)?;

        let mut block = Block::from_value(tlv::INTEREST_SIGNATURE_VALUE, value);
        block.encode();
        match self.parameter_index(tlv::INTEREST_SIGNATURE_VALUE) {
            Some(i) => self.parameters[i] = block,
            None => self.parameters.insert(info_index + 1, block),
        }
        self.add_or_replace_parameters_digest();
        self.reset_wire();
        Ok(self)
    }

    /// Whether the Interest carries a complete signature.
    pub fn is_signed(&self) -> bool {
        self.has_application_parameters()
            && self.find_parameter(tlv::INTEREST_SIGNATURE_INFO).is_some()
            && self.find_parameter(tlv::INTEREST_SIGNATURE_VALUE).is_some()
            && self
                .name
                .get(-1)
                .is_some_and(Component::is_parameters_sha256_digest)
    }

    /// The two byte ranges covered by an Interest signature:
    ///
    /// 1. the name's components, excluding the trailing digest component;
    /// 2. the parameter blocks from ApplicationParameters up to, excluding,
    ///    InterestSignatureValue.
    pub fn extract_signed_ranges(&self) -> Result<Vec<Bytes>> {
        let last = self
            .name
            .get(-1)
            .filter(|c| c.is_parameters_sha256_digest())
            .ok_or(PreconditionError::MissingParametersDigest)?;
        if self.find_parameter(tlv::INTEREST_SIGNATURE_INFO).is_none() {
            return Err(PreconditionError::MissingSignatureInfo.into());
        }

        let name_value = self.name.to_block().value_bytes();
        let name_range = name_value.slice(..name_value.len() - last.size());

        let signed_count = self
            .parameters
            .iter()
            .take_while(|b| b.tlv_type() != tlv::INTEREST_SIGNATURE_VALUE)
            .count();
        let signed = &self.parameters[..signed_count];
        let parameters_range = match self.wire.as_ref().and_then(|w| contiguous_wire(w, signed)) {
            Some(range) => range,
            None => match signed {
                [only] => only.to_wire(),
                blocks => {
                    let mut buf = Vec::new();
                    for block in blocks {
                        buf.extend_from_slice(&block.to_wire());
                    }
                    Bytes::from(buf)
                }
            },
        };
        Ok(vec![name_range, parameters_range])
    }

    fn parameter_index(&self, tlv_type: u32) -> Option<usize> {
        self.parameters.iter().position(|b| b.tlv_type() == tlv_type)
    }

    fn find_parameter(&self, tlv_type: u32) -> Option<&Block> {
        self.parameters.iter().find(|b| b.tlv_type() == tlv_type)
    }

    // Matching

    /// Whether `data` satisfies this Interest.
    ///
    /// A name ending in an ImplicitSha256DigestComponent is matched against
    /// the Data's full name, which requires the Data to carry a wire
    /// encoding; otherwise the match fails.
    pub fn matches_data(&self, data: &Data) -> bool {
        let data_name = data.name();
        if self.name.len() == data_name.len() + 1 {
            if !self
                .name
                .get(-1)
                .is_some_and(Component::is_implicit_sha256_digest)
            {
                return false;
            }
            match data.full_name() {
                Ok(full_name) if full_name == self.name => {}
                _ => return false,
            }
        } else if self.can_be_prefix {
            if !self.name.is_prefix_of(data_name) {
                return false;
            }
        } else if &self.name != data_name {
            return false;
        }

        !(self.must_be_fresh && data.freshness_period().is_zero())
    }

    /// Whether two Interests would retrieve the same Data.
    pub fn matches_interest(&self, other: &Interest) -> bool {
        self.name == other.name
            && self.can_be_prefix == other.can_be_prefix
            && self.must_be_fresh == other.must_be_fresh
    }
}

fn check_order(
    last_element: &mut u32,
    rank: u32,
    label: &'static str,
) -> std::result::Result<(), DecodeError> {
    if *last_element >= rank {
        return Err(DecodeError::OutOfOrder(label));
    }
    *last_element = rank;
    Ok(())
}

fn check_empty(element: &Block, label: &'static str) -> std::result::Result<(), DecodeError> {
    if element.value_size() != 0 {
        return Err(DecodeError::malformed(label, "TLV-LENGTH must be 0"));
    }
    Ok(())
}

/// Accepts a list of Names, or legacy Delegation{Preference, Name}
/// elements ordered by preference.
fn decode_forwarding_hint(block: &Block) -> std::result::Result<Vec<Name>, DecodeError> {
    let mut block = block.clone();
    block.parse()?;

    let mut names = Vec::new();
    let mut delegations = Vec::new();
    for element in block.elements() {
        match element.tlv_type() {
            tlv::NAME => names.push(Name::wire_decode(element)?),
            tlv::LINK_DELEGATION => {
                let mut delegation = element.clone();
                delegation.parse()?;
                let preference = delegation
                    .find(tlv::LINK_PREFERENCE)
                    .ok_or(DecodeError::Missing("Preference"))?
                    .read_non_negative_integer()?;
                let name = Name::wire_decode(
                    delegation.find(tlv::NAME).ok_or(DecodeError::Missing("Name"))?,
                )?;
                delegations.push((preference, name));
            }
            other if tlv::is_critical_type(other) => {
                return Err(DecodeError::malformed(
                    "ForwardingHint",
                    format!("unexpected TLV-TYPE {other}"),
                ));
            }
            _ => {}
        }
    }

    if !delegations.is_empty() {
        tracing::debug!(count = delegations.len(), "normalizing legacy ForwardingHint delegations");
        delegations.sort_by_key(|(preference, _)| *preference);
        names.extend(delegations.into_iter().map(|(_, name)| name));
    }
    Ok(names)
}

impl TlvEncode for Interest {
    fn encode_to<E: Encoder>(&self, encoder: &mut E) -> Result<usize> {
        let len = self.prepend_value_to(encoder);
        Ok(len + encoder.prepend_tl(tlv::INTEREST, len))
    }
}

impl PartialEq for Interest {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.can_be_prefix == other.can_be_prefix
            && self.must_be_fresh == other.must_be_fresh
            && self.forwarding_hint == other.forwarding_hint
            && self.nonce == other.nonce
            && self.lifetime == other.lifetime
            && self.hop_limit == other.hop_limit
            && self.parameters == other.parameters
    }
}

impl Eq for Interest {}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        let mut delim = '?';
        let mut field = |f: &mut fmt::Formatter<'_>, text: fmt::Arguments<'_>| {
            let result = write!(f, "{delim}{text}");
            delim = '&';
            result
        };
        if self.can_be_prefix {
            field(f, format_args!("CanBePrefix"))?;
        }
        if self.must_be_fresh {
            field(f, format_args!("MustBeFresh"))?;
        }
        if let Some(nonce) = &self.nonce {
            field(f, format_args!("Nonce={nonce}"))?;
        }
        if self.lifetime != DEFAULT_INTEREST_LIFETIME {
            field(f, format_args!("Lifetime={}", self.lifetime.as_millis()))?;
        }
        if let Some(hop_limit) = self.hop_limit {
            field(f, format_args!("HopLimit={hop_limit}"))?;
        }
        Ok(())
    }
}

/// The encodings of `blocks` as one slice of `buffer`, if they lie back to
/// back inside it.
fn contiguous_wire(buffer: &Bytes, blocks: &[Block]) -> Option<Bytes> {
    let base = buffer.as_ptr() as usize;
    let start = (blocks.first()?.wire()?.as_ptr() as usize).checked_sub(base)?;
    let mut end = start;
    for block in blocks {
        let wire = block.wire()?;
        if wire.as_ptr() as usize != base + end {
            return None;
        }
        end += wire.len();
    }
    (end <= buffer.len()).then(|| buffer.slice(start..end))
}
