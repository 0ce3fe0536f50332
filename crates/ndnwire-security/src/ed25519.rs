//! Ed25519 signing keys and public keys.
//!
//! Wraps ed25519-dalek with strong types. The signed ranges are
//! concatenated and signed as one message.

use bytes::Bytes;
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use ndnwire_name::Name;
use ndnwire_packet::{KeyLocator, SignatureType};

use crate::error::SecurityError;
use crate::signer::{Signer, Verifier};

fn concat(ranges: &[Bytes]) -> Vec<u8> {
    let mut message = Vec::with_capacity(ranges.iter().map(Bytes::len).sum());
    for range in ranges {
        message.extend_from_slice(range);
    }
    message
}

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut arr = [0u8; 32];
        hex::decode_to_slice(s, &mut arr)?;
        Ok(Self(arr))
    }

    /// SHA-256 of the key bytes, as carried in a KeyDigest locator.
    pub fn key_digest(&self) -> [u8; 32] {
        Sha256::digest(self.0).into()
    }

    /// Check a signature over a single message.
    pub fn verify_message(&self, message: &[u8], signature: &[u8]) -> Result<(), SecurityError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| SecurityError::InvalidPublicKey)?;
        let Ok(signature) = Signature::from_slice(signature) else {
            tracing::debug!(len = signature.len(), "Ed25519 signature has the wrong length");
            return Err(SecurityError::InvalidSignature);
        };
        verifying_key
            .verify(message, &signature)
            .map_err(|_| SecurityError::InvalidSignature)
    }
}

impl Verifier for Ed25519PublicKey {
    fn signature_type(&self) -> SignatureType {
        SignatureType::ED25519
    }

    fn verify(&self, ranges: &[Bytes], signature: &[u8]) -> bool {
        self.verify_message(&concat(ranges), signature).is_ok()
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Ed25519PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Ed25519PublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// An Ed25519 signing key, optionally identified by a key name.
///
/// With a key name the KeyLocator is that name; without one it is the
/// KeyDigest of the public key.
#[derive(Clone)]
pub struct Ed25519Key {
    signing_key: SigningKey,
    key_name: Option<Name>,
}

impl Ed25519Key {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
            key_name: None,
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
            key_name: None,
        }
    }

    pub fn with_key_name(mut self, key_name: Name) -> Self {
        self.key_name = Some(key_name);
        self
    }

    pub fn key_name(&self) -> Option<&Name> {
        self.key_name.as_ref()
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// The raw seed bytes (secret key material).
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl Signer for Ed25519Key {
    fn signature_type(&self) -> SignatureType {
        SignatureType::ED25519
    }

    fn key_locator(&self) -> Option<KeyLocator> {
        Some(match &self.key_name {
            Some(name) => KeyLocator::Name(name.clone()),
            None => KeyLocator::key_digest(self.public_key().key_digest().to_vec()),
        })
    }

    fn sign(&self, ranges: &[Bytes]) -> Bytes {
        let signature = self.signing_key.sign(&concat(ranges));
        Bytes::copy_from_slice(&signature.to_bytes())
    }
}

impl Verifier for Ed25519Key {
    fn signature_type(&self) -> SignatureType {
        SignatureType::ED25519
    }

    fn verify(&self, ranges: &[Bytes], signature: &[u8]) -> bool {
        Verifier::verify(&self.public_key(), ranges, signature)
    }
}

impl fmt::Debug for Ed25519Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Key({:?})", self.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_ranges() {
        let key = Ed25519Key::generate();
        let ranges = [Bytes::from_static(b"hello"), Bytes::from_static(b" world")];
        let signature = key.sign(&ranges);
        assert_eq!(signature.len(), 64);

        let public = key.public_key();
        assert!(Verifier::verify(&public, &ranges, &signature));
        assert!(Verifier::verify(&public, &[Bytes::from_static(b"hello world")], &signature));
        assert!(!Verifier::verify(&public, &[Bytes::from_static(b"hello worlD")], &signature));
        assert!(!Verifier::verify(&public, &ranges, &signature[..63]));
    }

    #[test]
    fn test_deterministic_from_seed() {
        let seed = [0x42u8; 32];
        let a = Ed25519Key::from_seed(&seed);
        let b = Ed25519Key::from_seed(&seed);
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.seed(), seed);

        let ranges = [Bytes::from_static(b"m")];
        assert_eq!(a.sign(&ranges), b.sign(&ranges));
    }

    #[test]
    fn test_key_locator() {
        let key = Ed25519Key::from_seed(&[1; 32]);
        let digest = key.key_locator().unwrap();
        assert_eq!(
            digest.key_digest_value().unwrap().as_ref(),
            &key.public_key().key_digest()
        );

        let named = key.with_key_name("/alice/KEY/1".parse().unwrap());
        assert_eq!(
            named.key_locator(),
            Some(KeyLocator::Name("/alice/KEY/1".parse().unwrap()))
        );
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let pk = Ed25519Key::generate().public_key();
        assert_eq!(Ed25519PublicKey::from_hex(&pk.to_hex()).unwrap(), pk);
        assert!(Ed25519PublicKey::from_hex("00").is_err());
    }
}
