//! Golden test vectors for cross-implementation verification.
//!
//! Every implementation of the NDN packet format must agree on:
//! - the wire encoding of each vector
//! - the name decoded from it, in alternate URI form
//! - the re-encoding of the decoded fields

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use ndnwire::prelude::*;
use ndnwire::{TlvEncode, UriFormat};
use ndnwire_testkit::{all_vectors, init_test_tracing, TestFixture, VectorKind};

/// A single golden test vector.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct GoldenVector {
    pub name: String,
    pub description: String,
    pub kind: String,
    pub wire: String,       // hex
    pub uri: String,        // alternate URI form
    pub reencoded: String,  // hex, from decoded fields
}

fn reencode(kind: VectorKind, wire: Bytes) -> anyhow::Result<(Name, Bytes)> {
    Ok(match kind {
        VectorKind::Name => {
            let name = Name::decode(wire)?;
            let bytes = name.wire_encode();
            (name, bytes)
        }
        VectorKind::Interest => {
            let interest = Interest::decode(wire)?;
            let bytes = interest.encode_to_bytes()?;
            (interest.name().clone(), bytes)
        }
        VectorKind::Data => {
            let data = Data::decode(wire)?;
            let bytes = data.encode_to_bytes()?;
            (data.name().clone(), bytes)
        }
    })
}

/// Generate all golden vectors from the testkit set.
fn generate_all_vectors() -> anyhow::Result<Vec<GoldenVector>> {
    all_vectors()
        .into_iter()
        .map(|v| {
            let (name, reencoded) =
                reencode(v.kind, v.wire()).with_context(|| format!("vector {}", v.name))?;
            Ok(GoldenVector {
                name: v.name.to_string(),
                description: v.description.to_string(),
                kind: format!("{:?}", v.kind),
                wire: v.wire_hex.to_string(),
                uri: name.to_uri(UriFormat::Alternate),
                reencoded: hex::encode(reencoded),
            })
        })
        .collect()
}

#[test]
fn test_vectors_reencode_identically() -> anyhow::Result<()> {
    init_test_tracing();
    let vectors = generate_all_vectors()?;
    assert_eq!(vectors.len(), all_vectors().len());

    for (golden, source) in vectors.iter().zip(all_vectors()) {
        assert_eq!(golden.reencoded, golden.wire, "re-encoding mismatch for {}", golden.name);
        assert_eq!(golden.uri, source.uri, "uri mismatch for {}", golden.name);
    }
    Ok(())
}

#[test]
fn test_vectors_json_roundtrip() -> anyhow::Result<()> {
    let vectors = generate_all_vectors()?;
    let json = serde_json::to_string_pretty(&vectors)?;
    let parsed: Vec<GoldenVector> = serde_json::from_str(&json)?;
    assert_eq!(parsed, vectors);
    Ok(())
}

#[test]
fn test_interest_nonce_golden() -> anyhow::Result<()> {
    let mut interest = Interest::new("/a/b".parse()?)?;
    interest.set_nonce(Some(ndnwire::Nonce::from(0x0102_0304u32)));
    assert_eq!(
        hex::encode(interest.wire_encode()?),
        "050a07060801610801620a0401020304"
    );
    Ok(())
}

#[test]
fn test_signed_data_is_deterministic() -> anyhow::Result<()> {
    init_test_tracing();
    let fixture = TestFixture::with_seed([0x42; 32]);
    let a = fixture.make_signed_data("/golden/data", b"hello world")?;
    let b = fixture.make_signed_data("/golden/data", b"hello world")?;

    let wire = a.wire().ok_or_else(|| anyhow!("signed Data has no wire"))?;
    assert_eq!(Some(wire), b.wire());

    let decoded = Packet::decode(wire.clone())?;
    assert!(decoded.verify(&fixture.public_key())?);
    Ok(())
}

#[test]
fn test_signed_interest_verifies_after_decode() -> anyhow::Result<()> {
    let fixture = TestFixture::with_seed([0x07; 32]);
    let mut interest = fixture.make_signed_interest("/golden/cmd", b"\x01\x02")?;
    let wire = interest.wire_encode()?;

    let decoded = Packet::decode(wire)?;
    assert!(decoded.is_interest());
    assert!(decoded.verify(&fixture.key)?);
    Ok(())
}

// =============================================================================
// REJECTION TEST VECTORS
// These test that malformed input is rejected as a decode error.
// =============================================================================

const REJECTED: &[(&str, &str)] = &[
    ("truncated_length", "0505070308"),
    ("length_overflow", "05ff"),
    ("trailing_bytes", "0502070000"),
    ("can_be_prefix_before_name", "050421000700"),
    ("must_be_fresh_then_can_be_prefix", "0506070012002100"),
    ("unknown_critical", "050407001f00"),
    ("short_nonce", "050507000a0100"),
    ("long_hop_limit", "0506070022020001"),
    ("data_without_signature", "06050703080161"),
    ("data_name_not_first", "060714000703080161"),
    ("not_a_packet", "0700"),
];

#[test]
fn test_rejection_vectors() {
    for (name, hex_wire) in REJECTED {
        let wire = Bytes::from(hex::decode(hex_wire).unwrap());
        match Packet::decode(wire) {
            Ok(packet) => panic!("{name} decoded as {packet}"),
            Err(e) => assert!(e.is_decode(), "{name}: expected decode error, got {e}"),
        }
    }
}

#[test]
fn test_parameters_digest_mismatch_rejected() -> anyhow::Result<()> {
    let mut interest = Interest::new("/a".parse()?)?;
    interest.set_application_parameters_bytes(&b"p"[..]);
    let wire = interest.wire_encode()?;

    // flip the last byte of ApplicationParameters
    let mut tampered = wire.to_vec();
    let last = tampered.len() - 1;
    tampered[last] ^= 0xFF;

    let err = Packet::decode(Bytes::from(tampered)).unwrap_err();
    assert!(matches!(
        err,
        NdnError::Wire(ndnwire::core::Error::Decode(
            ndnwire::core::DecodeError::ParametersDigestMismatch
        ))
    ));
    Ok(())
}
