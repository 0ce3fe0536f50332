//! Hierarchical names.

use bytes::Bytes;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use ndnwire_core::{
    tlv, Block, ConstructionError, DecodeError, Encoder, Result, TlvEncode, UriFormat,
};

use crate::component::Component;
use crate::component_type::DIGEST_LENGTH;

/// An ordered sequence of [`Component`]s.
///
/// Names order component by component, a proper prefix sorting before every
/// name it prefixes. Sub-names share component buffers with the name they
/// were taken from.
///
/// The Name element's encoding is cached: a decoded name keeps the buffer it
/// was read from, an edited one re-encodes on the next use.
#[derive(Clone, Default)]
pub struct Name {
    components: Vec<Component>,
    wire: OnceLock<Bytes>,
}

impl Name {
    /// The empty name `/`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_components(components: Vec<Component>) -> Self {
        Self {
            components,
            wire: OnceLock::new(),
        }
    }

    /// Parse the URI form, e.g. `/a/b/seg=3` or `ndn:/a`.
    ///
    /// A leading scheme, a `//authority` and a trailing `/` are ignored. An
    /// empty component between two slashes is an error.
    pub fn from_uri(uri: &str) -> std::result::Result<Self, ConstructionError> {
        let mut rest = uri.trim();

        if let Some(colon) = rest.find(':') {
            let before_slash = rest.find('/').map_or(true, |slash| colon < slash);
            if before_slash {
                rest = &rest[colon + 1..];
            }
        }

        if let Some(after) = rest.strip_prefix("//") {
            match after.find('/') {
                Some(slash) => rest = &after[slash + 1..],
                None => return Ok(Self::new()),
            }
        } else if let Some(after) = rest.strip_prefix('/') {
            rest = after;
        }

        let mut name = Self::new();
        let mut start = 0;
        while start < rest.len() {
            let end = rest[start..].find('/').map_or(rest.len(), |i| start + i);
            name.components
                .push(Component::from_escaped_str(&rest[start..end])?);
            start = end + 1;
        }
        Ok(name)
    }

    /// Decode a Name element.
    pub fn wire_decode(block: &Block) -> std::result::Result<Self, DecodeError> {
        if block.tlv_type() != tlv::NAME {
            return Err(DecodeError::UnexpectedType {
                expected: tlv::NAME,
                actual: block.tlv_type(),
            });
        }
        let mut block = block.clone();
        block.parse()?;
        let components = block
            .elements()
            .iter()
            .cloned()
            .map(Component::from_block)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                tracing::debug!(error = %e, "Name holds an invalid component");
                e
            })?;
        tracing::trace!(components = components.len(), "decoded Name");
        Ok(Self {
            components,
            wire: block.wire().cloned().map_or_else(OnceLock::new, OnceLock::from),
        })
    }

    /// Decode a buffer holding exactly one Name element.
    pub fn decode(wire: Bytes) -> std::result::Result<Self, DecodeError> {
        Self::wire_decode(&Block::decode(wire)?)
    }

    /// The Name element as an encoded block.
    pub fn to_block(&self) -> Block {
        let wire = self.wire_encode();
        Block::try_decode_at(&wire, 0).unwrap_or_else(|| self.build_block())
    }

    /// The Name element's wire encoding, encoded at most once per edit.
    pub fn wire_encode(&self) -> Bytes {
        self.wire
            .get_or_init(|| self.build_block().to_wire())
            .clone()
    }

    fn build_block(&self) -> Block {
        let mut block = Block::nested(
            tlv::NAME,
            self.components.iter().cloned().map(Block::from).collect(),
        );
        block.encode();
        block
    }

    /// Whether the encoding is cached.
    pub fn has_wire(&self) -> bool {
        self.wire.get().is_some()
    }

    /// Prepend the Name element to `encoder`, from the cached encoding.
    pub fn prepend_to<E: Encoder>(&self, encoder: &mut E) -> usize {
        encoder.prepend_bytes(&self.wire_encode())
    }

    fn reset_wire(&mut self) {
        self.wire.take();
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Component> {
        self.components.iter()
    }

    fn resolve(&self, index: isize) -> Option<usize> {
        let len = self.components.len() as isize;
        let i = if index < 0 { len + index } else { index };
        (0..len).contains(&i).then_some(i as usize)
    }

    /// The component at `index`; negative indexes count from the end.
    pub fn get(&self, index: isize) -> Option<&Component> {
        self.resolve(index).map(|i| &self.components[i])
    }

    /// Like [`Name::get`], but an out-of-range index is an error.
    pub fn at(&self, index: isize) -> std::result::Result<&Component, ConstructionError> {
        self.get(index).ok_or(ConstructionError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    /// Up to `count` components starting at `start`.
    ///
    /// A negative `start` counts from the end; one still before the beginning
    /// is clamped to 0. `None` takes every remaining component.
    pub fn sub_name(&self, start: isize, count: Option<usize>) -> Name {
        let len = self.components.len();
        let start = if start < 0 {
            (len as isize + start).max(0) as usize
        } else {
            (start as usize).min(len)
        };
        let end = match count {
            Some(count) => start.saturating_add(count).min(len),
            None => len,
        };
        Self::from_components(self.components[start..end].to_vec())
    }

    /// The first `n` components; a negative `n` drops components from the end.
    pub fn prefix(&self, n: isize) -> Name {
        if n < 0 {
            let keep = (self.len() as isize + n).max(0) as usize;
            self.sub_name(0, Some(keep))
        } else {
            self.sub_name(0, Some(n as usize))
        }
    }

    pub fn append(&mut self, component: Component) -> &mut Self {
        self.reset_wire();
        self.components.push(component);
        self
    }

    pub fn append_name(&mut self, name: &Name) -> &mut Self {
        self.reset_wire();
        self.components.extend(name.components.iter().cloned());
        self
    }

    /// Append a generic component holding `value`.
    pub fn append_generic(&mut self, value: impl Into<Bytes>) -> &mut Self {
        self.append(Component::generic(value))
    }

    pub fn append_keyword(&mut self, value: impl Into<Bytes>) -> &mut Self {
        self.append(Component::keyword(value))
    }

    /// Append a generic component holding the nonNegativeInteger `n`.
    pub fn append_number(&mut self, n: u64) -> &mut Self {
        self.append(Component::generic(ndnwire_core::encode_non_negative_integer(n)))
    }

    pub fn append_number_with_marker(&mut self, marker: u8, n: u64) -> &mut Self {
        self.append(Component::from_number_with_marker(marker, n))
    }

    pub fn append_segment(&mut self, n: u64) -> &mut Self {
        self.append(Component::from_segment(n))
    }

    pub fn append_byte_offset(&mut self, n: u64) -> &mut Self {
        self.append(Component::from_byte_offset(n))
    }

    /// Append a version; `None` uses the current time in milliseconds.
    pub fn append_version(&mut self, version: Option<u64>) -> &mut Self {
        let version = version.unwrap_or_else(|| now_since_epoch().as_millis() as u64);
        self.append(Component::from_version(version))
    }

    /// Append a timestamp in microseconds; `None` uses the current time.
    pub fn append_timestamp(&mut self, micros: Option<u64>) -> &mut Self {
        let micros = micros.unwrap_or_else(|| now_since_epoch().as_micros() as u64);
        self.append(Component::from_timestamp(micros))
    }

    pub fn append_sequence_number(&mut self, n: u64) -> &mut Self {
        self.append(Component::from_sequence_number(n))
    }

    pub fn append_implicit_sha256_digest(
        &mut self,
        digest: impl Into<Bytes>,
    ) -> std::result::Result<&mut Self, ConstructionError> {
        let component = Component::implicit_sha256_digest(digest)?;
        Ok(self.append(component))
    }

    pub fn append_parameters_sha256_digest(
        &mut self,
        digest: impl Into<Bytes>,
    ) -> std::result::Result<&mut Self, ConstructionError> {
        let component = Component::parameters_sha256_digest(digest)?;
        Ok(self.append(component))
    }

    /// Append an all-zero ParametersSha256DigestComponent.
    pub fn append_parameters_sha256_digest_placeholder(&mut self) -> &mut Self {
        self.append(parameters_digest_placeholder())
    }

    /// Replace the component at `index`.
    pub fn set(
        &mut self,
        index: isize,
        component: Component,
    ) -> std::result::Result<&mut Self, ConstructionError> {
        let i = self.index_or_err(index)?;
        self.reset_wire();
        self.components[i] = component;
        Ok(self)
    }

    /// Remove the component at `index`.
    pub fn erase(&mut self, index: isize) -> std::result::Result<Component, ConstructionError> {
        let i = self.index_or_err(index)?;
        self.reset_wire();
        Ok(self.components.remove(i))
    }

    pub fn clear(&mut self) {
        self.reset_wire();
        self.components.clear();
    }

    fn index_or_err(&self, index: isize) -> std::result::Result<usize, ConstructionError> {
        self.resolve(index).ok_or(ConstructionError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    /// Index of the first ParametersSha256DigestComponent.
    pub fn parameters_digest_index(&self) -> Option<usize> {
        self.components
            .iter()
            .position(Component::is_parameters_sha256_digest)
    }

    /// Number of ParametersSha256DigestComponents.
    pub fn count_parameters_digests(&self) -> usize {
        self.components
            .iter()
            .filter(|c| c.is_parameters_sha256_digest())
            .count()
    }

    /// The next name in canonical order.
    ///
    /// For the empty name this is `/sha256digest=00...00`; otherwise only the
    /// last component advances.
    pub fn successor(&self) -> Name {
        match self.components.last() {
            None => {
                let mut name = Name::new();
                name.append(Component::build(
                    tlv::IMPLICIT_SHA256_DIGEST_COMPONENT,
                    Bytes::from_static(&[0u8; DIGEST_LENGTH]),
                ));
                name
            }
            Some(last) => {
                let mut name = self.prefix(-1);
                name.append(last.successor());
                name
            }
        }
    }

    /// Whether this name is a prefix of (or equal to) `other`.
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.len() <= other.len()
            && self
                .components
                .iter()
                .zip(&other.components)
                .all(|(a, b)| a == b)
    }

    /// Canonical comparison.
    pub fn compare(&self, other: &Name) -> Ordering {
        self.compare_range(0, usize::MAX, other, 0, usize::MAX)
    }

    /// Compare `count1` components from `pos1` with `count2` components of
    /// `other` from `pos2`. Counts are clamped to the available components.
    pub fn compare_range(
        &self,
        pos1: usize,
        count1: usize,
        other: &Name,
        pos2: usize,
        count2: usize,
    ) -> Ordering {
        let lhs = range(&self.components, pos1, count1);
        let rhs = range(&other.components, pos2, count2);
        for (a, b) in lhs.iter().zip(rhs) {
            match a.compare(b) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        lhs.len().cmp(&rhs.len())
    }

    /// A copy whose components own private buffers.
    pub fn deep_copy(&self) -> Name {
        Self::from_components(self.components.iter().map(Component::deep_copy).collect())
    }

    /// Render in URI form.
    pub fn to_uri(&self, format: UriFormat) -> String {
        if self.components.is_empty() {
            return "/".to_owned();
        }
        let format = format.resolve();
        let mut out = String::new();
        for component in &self.components {
            out.push('/');
            component.write_uri(&mut out, format);
        }
        out
    }
}

fn range(components: &[Component], pos: usize, count: usize) -> &[Component] {
    let pos = pos.min(components.len());
    let end = pos.saturating_add(count).min(components.len());
    &components[pos..end]
}

fn parameters_digest_placeholder() -> Component {
    Component::build(
        tlv::PARAMETERS_SHA256_DIGEST_COMPONENT,
        Bytes::from_static(&[0u8; DIGEST_LENGTH]),
    )
}

fn now_since_epoch() -> std::time::Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

impl TlvEncode for Name {
    fn encode_to<E: Encoder>(&self, encoder: &mut E) -> Result<usize> {
        Ok(self.prepend_to(encoder))
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.components.hash(state);
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Index<usize> for Name {
    type Output = Component;

    fn index(&self, index: usize) -> &Component {
        &self.components[index]
    }
}

impl<'a> IntoIterator for &'a Name {
    type Item = &'a Component;
    type IntoIter = std::slice::Iter<'a, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

impl FromIterator<Component> for Name {
    fn from_iter<I: IntoIterator<Item = Component>>(iter: I) -> Self {
        Self::from_components(iter.into_iter().collect())
    }
}

impl FromStr for Name {
    type Err = ConstructionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_uri(s)
    }
}

impl TryFrom<&Block> for Name {
    type Error = DecodeError;

    fn try_from(block: &Block) -> std::result::Result<Self, Self::Error> {
        Self::wire_decode(block)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri(UriFormat::Default))
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.to_uri(UriFormat::Canonical))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn n(uri: &str) -> Name {
        uri.parse().unwrap()
    }

    #[test]
    fn test_from_uri() {
        assert_eq!(n("/a/b").len(), 2);
        assert_eq!(n("ndn:/a/b"), n("/a/b"));
        assert_eq!(n("ndn://authority/a/b"), n("/a/b"));
        assert_eq!(n("//authority"), Name::new());
        assert_eq!(n("/a/b/"), n("/a/b"));
        assert_eq!(n("a/b"), n("/a/b"));
        assert_eq!(n("/"), Name::new());
        assert_eq!(n(""), Name::new());
        assert!("/a//b".parse::<Name>().is_err());
        assert!("/a/../b".parse::<Name>().is_err());
    }

    #[test]
    fn test_to_uri() {
        assert_eq!(Name::new().to_uri(UriFormat::Alternate), "/");
        let name = n("/hello/8=world/seg=2/32=kw");
        assert_eq!(name.to_uri(UriFormat::Alternate), "/hello/world/seg=2/32=kw");
        assert_eq!(name.to_uri(UriFormat::Canonical), "/8=hello/8=world/50=%02/32=kw");
    }

    #[test]
    fn test_wire_roundtrip() {
        let name = n("/a/b");
        let wire = name.wire_encode();
        assert_eq!(wire.as_ref(), &[0x07, 0x06, 0x08, 0x01, b'a', 0x08, 0x01, b'b']);
        assert_eq!(Name::decode(wire.clone()).unwrap(), name);
        assert_eq!(name.encode_to_bytes().unwrap(), wire);

        let empty = Name::new();
        assert_eq!(empty.wire_encode().as_ref(), &[0x07, 0x00]);
        assert_eq!(Name::decode(empty.wire_encode()).unwrap(), empty);
    }

    #[test]
    fn test_decoded_wire_is_reused_until_edited() {
        let buf = Bytes::from_static(&[0x07, 0x06, 0x08, 0x01, b'a', 0x08, 0x01, b'b']);
        let mut name = Name::decode(buf.clone()).unwrap();
        assert!(name.has_wire());
        assert_eq!(name.wire_encode().as_ptr(), buf.as_ptr());
        assert_eq!(name.encode_to_bytes().unwrap(), buf);

        let copy = name.clone();
        name.append_generic(&b"c"[..]);
        assert!(!name.has_wire());
        let wire = name.wire_encode();
        assert_ne!(wire.as_ptr(), buf.as_ptr());
        assert_eq!(wire, n("/a/b/c").wire_encode());
        assert_eq!(name.wire_encode().as_ptr(), wire.as_ptr());

        // the clone still holds the original buffer
        assert_eq!(copy.wire_encode().as_ptr(), buf.as_ptr());

        name.erase(-1).unwrap();
        assert_eq!(name.wire_encode(), buf);
        name.set(0, Component::generic(&b"z"[..])).unwrap();
        assert_eq!(name.wire_encode(), n("/z/b").wire_encode());
        name.clear();
        assert_eq!(name.wire_encode().as_ref(), &[0x07, 0x00]);
    }

    #[test]
    fn test_wire_decode_rejects_bad_components() {
        let wrong_type = Block::from_slice(&[0x08, 0x01, b'a']).unwrap();
        assert!(matches!(
            Name::wire_decode(&wrong_type),
            Err(DecodeError::UnexpectedType { expected: 7, actual: 8 })
        ));

        // ImplicitSha256DigestComponent with a 2-byte value
        let short_digest = Bytes::from_static(&[0x07, 0x04, 0x01, 0x02, 0xAA, 0xBB]);
        assert!(matches!(
            Name::decode(short_digest),
            Err(DecodeError::InvalidComponent(ConstructionError::DigestLength { .. }))
        ));
    }

    #[test]
    fn test_sub_names_share_buffers() {
        let name = Name::decode(Bytes::from_static(&[
            0x07, 0x09, 0x08, 0x01, b'a', 0x08, 0x01, b'b', 0x08, 0x01, b'c',
        ]))
        .unwrap();
        let sub = name.sub_name(1, Some(1));
        assert_eq!(sub, n("/b"));
        assert_eq!(sub[0].value().as_ptr(), name[1].value().as_ptr());
    }

    #[test]
    fn test_indexing() {
        let name = n("/a/b/c");
        assert_eq!(name.get(-1), Some(&Component::generic(&b"c"[..])));
        assert_eq!(name.get(0), Some(&Component::generic(&b"a"[..])));
        assert!(name.get(3).is_none());
        assert!(name.get(-4).is_none());
        assert_eq!(
            name.at(5).unwrap_err(),
            ConstructionError::IndexOutOfRange { index: 5, len: 3 }
        );
    }

    #[test]
    fn test_prefix_and_sub_name() {
        let name = n("/a/b/c/d");
        assert_eq!(name.prefix(2), n("/a/b"));
        assert_eq!(name.prefix(-1), n("/a/b/c"));
        assert_eq!(name.prefix(-10), Name::new());
        assert_eq!(name.prefix(10), name);
        assert_eq!(name.sub_name(-2, None), n("/c/d"));
        assert_eq!(name.sub_name(-10, Some(1)), n("/a"));
        assert_eq!(name.sub_name(7, None), Name::new());
    }

    #[test]
    fn test_mutation() {
        let mut name = n("/a/b");
        name.set(-1, Component::generic(&b"z"[..])).unwrap();
        assert_eq!(name, n("/a/z"));
        assert_eq!(name.erase(0).unwrap(), Component::generic(&b"a"[..]));
        assert_eq!(name, n("/z"));
        assert!(name.erase(3).is_err());
        name.append_name(&n("/x/y"));
        assert_eq!(name, n("/z/x/y"));
        name.clear();
        assert!(name.is_empty());
    }

    #[test]
    fn test_ordering() {
        assert!(n("/a") < n("/a/b"));
        assert!(n("/a/b") < n("/b"));
        assert!(n("/a/b") < n("/a/c"));
        assert!(Name::new() < n("/a"));
        assert_eq!(n("/a/b").compare_range(1, 1, &n("/b/c"), 0, 1), Ordering::Equal);
    }

    #[test]
    fn test_is_prefix_of() {
        assert!(n("/a").is_prefix_of(&n("/a/b")));
        assert!(n("/a/b").is_prefix_of(&n("/a/b")));
        assert!(Name::new().is_prefix_of(&n("/a")));
        assert!(!n("/a/b").is_prefix_of(&n("/a")));
        assert!(!n("/b").is_prefix_of(&n("/a/b")));
    }

    #[test]
    fn test_successor() {
        let empty = Name::new().successor();
        assert_eq!(empty.len(), 1);
        assert!(empty[0].is_implicit_sha256_digest());
        assert!(empty[0].value().iter().all(|&b| b == 0));

        assert_eq!(n("/a/b").successor(), n("/a/c"));
        assert_eq!(n("/a/...").successor(), n("/a/%00"));
    }

    #[test]
    fn test_parameters_digest_helpers() {
        let mut name = n("/a");
        name.append_parameters_sha256_digest_placeholder();
        assert_eq!(name.parameters_digest_index(), Some(1));
        assert_eq!(name.count_parameters_digests(), 1);
        assert!(name.append_parameters_sha256_digest(vec![0u8; 3]).is_err());
        assert_eq!(name.len(), 2);
    }

    #[test]
    fn test_append_conventions() {
        let mut name = Name::new();
        name.append_version(Some(7)).append_segment(3);
        assert!(name[0].is_version());
        assert!(name[1].is_segment());

        name.append_timestamp(None);
        assert!(name[2].to_timestamp().unwrap() > 1_600_000_000_000_000);
    }

    #[test]
    fn test_deep_copy() {
        let name = n("/a/b");
        let copy = name.deep_copy();
        assert_eq!(copy, name);
        assert_ne!(copy[0].value().as_ptr(), name[0].value().as_ptr());
    }

    fn arb_component() -> impl Strategy<Value = Component> {
        (3u32..300, prop::collection::vec(any::<u8>(), 0..8))
            .prop_map(|(t, v)| Component::new(t, v).unwrap())
    }

    proptest! {
        #[test]
        fn successor_sorts_after(components in prop::collection::vec(arb_component(), 0..5)) {
            let name = Name::from_components(components);
            let next = name.successor();
            prop_assert!(next > name);
        }

        #[test]
        fn canonical_uri_roundtrip(components in prop::collection::vec(arb_component(), 0..5)) {
            let name = Name::from_components(components);
            let parsed = Name::from_uri(&name.to_uri(UriFormat::Canonical)).unwrap();
            prop_assert_eq!(parsed, name);
        }

        #[test]
        fn wire_roundtrip(components in prop::collection::vec(arb_component(), 0..5)) {
            let name = Name::from_components(components);
            prop_assert_eq!(Name::decode(name.wire_encode()).unwrap(), name);
        }
    }
}
