//! Golden wire vectors.
//!
//! Each vector pairs a hand-checked encoding with a builder that produces
//! the same packet through the public API. Builders use explicit naming
//! conventions so the result does not depend on the installed
//! `WireConfig`.

use bytes::Bytes;
use std::time::Duration;

use ndnwire_core::{Convention, TlvEncode};
use ndnwire_name::{Component, Name, NumberConvention};
use ndnwire_packet::{ContentType, Data, Interest, Nonce, SignatureInfo, SignatureType};

/// What a vector's wire holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorKind {
    Name,
    Interest,
    Data,
}

/// A golden wire vector.
#[derive(Debug, Clone)]
pub struct WireVector {
    /// Short identifier.
    pub name: &'static str,
    pub description: &'static str,
    pub kind: VectorKind,
    /// Expected encoding (lowercase hex).
    pub wire_hex: &'static str,
    /// Expected packet name in alternate URI form.
    pub uri: &'static str,
    /// Builds the same element through the API.
    pub build: fn() -> Bytes,
}

impl WireVector {
    pub fn wire(&self) -> Bytes {
        hex::decode(self.wire_hex)
            .map(Bytes::from)
            .unwrap_or_default()
    }
}

fn uri(s: &str) -> Name {
    s.parse().unwrap_or_default()
}

fn encode<T: TlvEncode>(packet: &T) -> Bytes {
    packet.encode_to_bytes().unwrap_or_default()
}

fn interest_minimal() -> Bytes {
    Interest::new(uri("/a")).map(|i| encode(&i)).unwrap_or_default()
}

fn interest_nonce() -> Bytes {
    let Ok(mut interest) = Interest::new(uri("/a/b")) else {
        return Bytes::new();
    };
    interest.set_nonce(Some(Nonce::from(0x0102_0304u32)));
    encode(&interest)
}

fn interest_selectors() -> Bytes {
    let Ok(mut interest) = Interest::new(uri("/a")) else {
        return Bytes::new();
    };
    interest
        .set_can_be_prefix(true)
        .set_must_be_fresh(true)
        .set_nonce(Some(Nonce::from(1u32)))
        .set_interest_lifetime(Duration::from_millis(1000))
        .set_hop_limit(Some(5));
    encode(&interest)
}

fn data_minimal() -> Bytes {
    let mut data = Data::new(uri("/a"));
    data.set_content_bytes(&b"hi"[..])
        .set_signature_info(SignatureInfo::new(SignatureType::DIGEST_SHA256))
        .set_signature_value(vec![0xAA; 4]);
    encode(&data)
}

fn data_meta_info() -> Bytes {
    let mut data = Data::new(uri("/a"));
    data.set_content_type(ContentType::KEY)
        .set_freshness_period(Duration::from_secs(10))
        .set_signature_info(SignatureInfo::new(SignatureType::DIGEST_SHA256))
        .set_signature_value(Bytes::new());
    encode(&data)
}

fn name_typed_numbers() -> Bytes {
    let name: Name = [
        Component::from_convention(NumberConvention::Segment, 5, Convention::Typed),
        Component::from_convention(NumberConvention::Version, 3, Convention::Typed),
    ]
    .into_iter()
    .collect();
    name.wire_encode()
}

fn name_marker_segment() -> Bytes {
    let name: Name = std::iter::once(Component::from_convention(
        NumberConvention::Segment,
        5,
        Convention::Marker,
    ))
    .collect();
    name.wire_encode()
}

/// Get all golden vectors.
pub fn all_vectors() -> Vec<WireVector> {
    vec![
        WireVector {
            name: "interest_minimal",
            description: "Interest with a one-component name and no other fields",
            kind: VectorKind::Interest,
            wire_hex: "05050703080161",
            uri: "/a",
            build: interest_minimal,
        },
        WireVector {
            name: "interest_nonce",
            description: "Interest /a/b with Nonce 0x01020304",
            kind: VectorKind::Interest,
            wire_hex: "050a07060801610801620a0401020304",
            uri: "/a/b",
            build: interest_nonce,
        },
        WireVector {
            name: "interest_selectors",
            description: "CanBePrefix, MustBeFresh, Nonce, 1s lifetime, HopLimit 5",
            kind: VectorKind::Interest,
            wire_hex: "05160703080161210012000a04000000010c0203e8220105",
            uri: "/a",
            build: interest_selectors,
        },
        WireVector {
            name: "data_minimal",
            description: "Data /a with content \"hi\" and a placeholder DigestSha256 value",
            kind: VectorKind::Data,
            wire_hex: "0616070308016114001502686916031b01001704aaaaaaaa",
            uri: "/a",
            build: data_minimal,
        },
        WireVector {
            name: "data_meta_info",
            description: "Data /a with ContentType Key, 10s freshness, no content, empty signature",
            kind: VectorKind::Data,
            wire_hex: "0615070308016114071801021902271016031b01001700",
            uri: "/a",
            build: data_meta_info,
        },
        WireVector {
            name: "name_typed_numbers",
            description: "Segment 5 and version 3 as typed components",
            kind: VectorKind::Name,
            wire_hex: "0706320105360103",
            uri: "/seg=5/v=3",
            build: name_typed_numbers,
        },
        WireVector {
            name: "name_marker_segment",
            description: "Segment 5 as a marker-prefixed generic component",
            kind: VectorKind::Name,
            wire_hex: "070408020005",
            uri: "/%00%05",
            build: name_marker_segment,
        },
    ]
}

/// Check every vector's builder against its expected wire.
///
/// Returns `(name, matches, actual_hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let actual = hex::encode((v.build)());
            (v.name.to_string(), actual == v.wire_hex, actual)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_match_builders() {
        for (name, matches, actual) in verify_all_vectors() {
            assert!(matches, "vector {name} built as {actual}");
        }
    }

    #[test]
    fn test_vectors_are_deterministic() {
        for vector in all_vectors() {
            assert_eq!((vector.build)(), (vector.build)(), "{}", vector.name);
        }
    }

    #[test]
    fn test_vector_wires_decode() {
        for vector in all_vectors() {
            let wire = vector.wire();
            let name = match vector.kind {
                VectorKind::Name => Name::decode(wire).unwrap(),
                VectorKind::Interest => Interest::decode(wire).unwrap().name().clone(),
                VectorKind::Data => Data::decode(wire).unwrap().name().clone(),
            };
            assert_eq!(
                name.to_uri(ndnwire_core::UriFormat::Alternate),
                vector.uri,
                "{}",
                vector.name
            );
        }
    }
}
