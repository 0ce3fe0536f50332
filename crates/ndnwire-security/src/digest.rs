//! DigestSha256: a bare SHA-256 of the signed ranges.
//!
//! Provides integrity only. Anyone can produce it, so it carries no
//! KeyLocator.

use bytes::Bytes;
use sha2::{Digest, Sha256};

use ndnwire_packet::SignatureType;

use crate::signer::{Signer, Verifier};

/// Signer and verifier for [`SignatureType::DIGEST_SHA256`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigestSha256;

impl DigestSha256 {
    fn digest(ranges: &[Bytes]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for range in ranges {
            hasher.update(range);
        }
        hasher.finalize().into()
    }
}

impl Signer for DigestSha256 {
    fn signature_type(&self) -> SignatureType {
        SignatureType::DIGEST_SHA256
    }

    fn sign(&self, ranges: &[Bytes]) -> Bytes {
        Bytes::copy_from_slice(&Self::digest(ranges))
    }
}

impl Verifier for DigestSha256 {
    fn signature_type(&self) -> SignatureType {
        SignatureType::DIGEST_SHA256
    }

    fn verify(&self, ranges: &[Bytes], signature: &[u8]) -> bool {
        Self::digest(ranges).as_slice() == signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // SHA-256("abc")
        let expected =
            hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
                .unwrap();
        let signature = DigestSha256.sign(&[Bytes::from_static(b"a"), Bytes::from_static(b"bc")]);
        assert_eq!(signature.as_ref(), expected.as_slice());
    }

    #[test]
    fn test_verify() {
        let ranges = [Bytes::from_static(b"hello"), Bytes::from_static(b" world")];
        let signature = DigestSha256.sign(&ranges);
        assert!(DigestSha256.verify(&ranges, &signature));
        assert!(DigestSha256.verify(&[Bytes::from_static(b"hello world")], &signature));
        assert!(!DigestSha256.verify(&[Bytes::from_static(b"hello")], &signature));
        assert!(!DigestSha256.verify(&ranges, &signature[..31]));
    }
}
