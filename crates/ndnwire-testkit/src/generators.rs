//! Proptest generators for property-based testing.

use bytes::Bytes;
use proptest::prelude::*;
use std::time::Duration;

use ndnwire_core::tlv;
use ndnwire_name::{Component, Name, DIGEST_LENGTH};
use ndnwire_packet::{Data, Interest, Nonce, SignatureInfo, SignatureType};
use ndnwire_security::Ed25519Key;

/// Generate a random Ed25519 key.
pub fn ed25519_key() -> impl Strategy<Value = Ed25519Key> {
    any::<[u8; 32]>().prop_map(|seed| Ed25519Key::from_seed(&seed))
}

/// Generate a random Nonce.
pub fn nonce() -> impl Strategy<Value = Nonce> {
    any::<[u8; 4]>().prop_map(Nonce::from_bytes)
}

/// Generate component value bytes of at most `max_len` bytes.
pub fn component_value(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a GenericNameComponent.
pub fn generic_component() -> impl Strategy<Value = Component> {
    component_value(16).prop_map(Component::generic)
}

/// Generate a component of any valid type, digests included.
pub fn component() -> impl Strategy<Value = Component> {
    prop_oneof![
        4 => generic_component(),
        1 => any::<[u8; DIGEST_LENGTH]>().prop_map(Component::from_implicit_sha256_digest),
        1 => component_value(8).prop_map(Component::keyword),
        2 => (any::<u64>(), prop::sample::select(vec![
            tlv::SEGMENT_NAME_COMPONENT,
            tlv::BYTE_OFFSET_NAME_COMPONENT,
            tlv::VERSION_NAME_COMPONENT,
            tlv::TIMESTAMP_NAME_COMPONENT,
            tlv::SEQUENCE_NUM_NAME_COMPONENT,
        ]))
            .prop_filter_map("number component", |(n, t)| Component::from_number(n, t).ok()),
        1 => (component_type(), boundary_value())
            .prop_filter_map("typed component", |(t, v)| Component::new(t, v).ok()),
    ]
}

/// Generate a component TLV-TYPE on either side of the 1-byte and 3-byte
/// VarNumber forms.
pub fn component_type() -> impl Strategy<Value = u32> {
    prop_oneof![3u32..=31, 250u32..=260, 65_530u32..=65_535]
}

/// Generate value bytes, short or around the 253-byte length boundary.
pub fn boundary_value() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        component_value(8),
        prop::collection::vec(any::<u8>(), 250..=256),
    ]
}

/// Generate a name of up to `max_len` components, without digest
/// components.
pub fn name(max_len: usize) -> impl Strategy<Value = Name> {
    prop::collection::vec(generic_component(), 0..=max_len)
        .prop_map(|components| components.into_iter().collect())
}

/// Generate a name that may contain any component type except a
/// ParametersSha256DigestComponent.
pub fn mixed_name(max_len: usize) -> impl Strategy<Value = Name> {
    prop::collection::vec(component(), 0..=max_len)
        .prop_map(|components| components.into_iter().collect())
}

/// Parameters for generating an Interest.
#[derive(Debug, Clone)]
pub struct InterestParams {
    pub name: Name,
    pub can_be_prefix: bool,
    pub must_be_fresh: bool,
    pub nonce: Option<Nonce>,
    pub lifetime_ms: u64,
    pub hop_limit: Option<u8>,
    pub application_parameters: Option<Vec<u8>>,
}

impl Arbitrary for InterestParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            name(6),
            any::<bool>(),
            any::<bool>(),
            proptest::option::of(nonce()),
            0u64..=3_600_000,
            any::<Option<u8>>(),
            proptest::option::of(component_value(64)),
        )
            .prop_map(
                |(name, can_be_prefix, must_be_fresh, nonce, lifetime_ms, hop_limit, params)| {
                    InterestParams {
                        name,
                        can_be_prefix,
                        must_be_fresh,
                        nonce,
                        lifetime_ms,
                        hop_limit,
                        application_parameters: params,
                    }
                },
            )
            .boxed()
    }
}

/// Build an Interest from parameters.
pub fn interest_from_params(params: &InterestParams) -> Interest {
    let mut interest = Interest::default();
    interest
        .set_name(params.name.clone())
        .expect("generated names carry no digest")
        .set_can_be_prefix(params.can_be_prefix)
        .set_must_be_fresh(params.must_be_fresh)
        .set_nonce(params.nonce)
        .set_interest_lifetime(Duration::from_millis(params.lifetime_ms))
        .set_hop_limit(params.hop_limit);
    if let Some(value) = &params.application_parameters {
        interest.set_application_parameters_bytes(Bytes::copy_from_slice(value));
    }
    interest
}

/// Parameters for generating a Data.
#[derive(Debug, Clone)]
pub struct DataParams {
    pub name: Name,
    pub content: Option<Vec<u8>>,
    pub freshness_ms: u64,
    pub signature_value: Vec<u8>,
}

impl Arbitrary for DataParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            name(6),
            proptest::option::of(component_value(256)),
            0u64..=86_400_000,
            component_value(64),
        )
            .prop_map(|(name, content, freshness_ms, signature_value)| DataParams {
                name,
                content,
                freshness_ms,
                signature_value,
            })
            .boxed()
    }
}

/// Build a Data from parameters, with a DigestSha256 SignatureInfo and the
/// generated bytes as its SignatureValue.
pub fn data_from_params(params: &DataParams) -> Data {
    let mut data = Data::new(params.name.clone());
    data.set_freshness_period(Duration::from_millis(params.freshness_ms))
        .set_signature_info(SignatureInfo::new(SignatureType::DIGEST_SHA256))
        .set_signature_value(Bytes::copy_from_slice(&params.signature_value));
    if let Some(content) = &params.content {
        data.set_content_bytes(Bytes::copy_from_slice(content));
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_interest_roundtrip(params: InterestParams) {
            let mut interest = interest_from_params(&params);
            prop_assert!(interest.is_parameters_digest_valid());

            let wire = interest.wire_encode().unwrap();
            let decoded = Interest::decode(wire).unwrap();
            prop_assert_eq!(decoded, interest);
        }

        #[test]
        fn test_data_roundtrip(params: DataParams) {
            let mut data = data_from_params(&params);
            let wire = data.wire_encode().unwrap();
            let decoded = Data::decode(wire.clone()).unwrap();
            prop_assert_eq!(decoded.wire(), Some(&wire));
            prop_assert_eq!(decoded, data);
        }

        #[test]
        fn test_mixed_name_roundtrip(name in mixed_name(8)) {
            prop_assert_eq!(Name::decode(name.wire_encode()).unwrap(), name);
        }

        #[test]
        fn test_typed_component_order_across_length_forms(
            ta in component_type(), va in boundary_value(),
            tb in component_type(), vb in boundary_value(),
        ) {
            let a = Component::new(ta, va).unwrap();
            let b = Component::new(tb, vb).unwrap();
            prop_assert_eq!(a.cmp(&b), a.wire().as_ref().cmp(b.wire().as_ref()));
            prop_assert_eq!(Component::from_block(ndnwire_core::Block::decode(a.wire()).unwrap()).unwrap(), a);
        }
    }
}
