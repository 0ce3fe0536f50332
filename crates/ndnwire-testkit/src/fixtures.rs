//! Test fixtures and helpers.
//!
//! Ready-made signed packets from deterministic keys.

use bytes::Bytes;

use ndnwire_name::Name;
use ndnwire_packet::{Data, Interest};
use ndnwire_security::{sign_data, sign_interest, Ed25519Key, Ed25519PublicKey, SecurityError};

/// A test fixture holding an Ed25519 key with a key name.
pub struct TestFixture {
    pub key: Ed25519Key,
}

impl TestFixture {
    /// Create a fixture with a random key named `/test/KEY/1`.
    pub fn new() -> Self {
        Self::from_key(Ed25519Key::generate())
    }

    /// Create with a deterministic key from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::from_key(Ed25519Key::from_seed(&seed))
    }

    fn from_key(key: Ed25519Key) -> Self {
        let mut key_name = Name::new();
        key_name
            .append_generic(&b"test"[..])
            .append_generic(&b"KEY"[..])
            .append_generic(&b"1"[..]);
        Self {
            key: key.with_key_name(key_name),
        }
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.key.public_key()
    }

    /// Create a signed Interest for `uri` carrying `parameters`.
    pub fn make_signed_interest(&self, uri: &str, parameters: &[u8]) -> Result<Interest, SecurityError> {
        let name: Name = uri.parse().map_err(ndnwire_core::Error::from)?;
        let mut interest = Interest::new(name).map_err(ndnwire_core::Error::from)?;
        interest.set_application_parameters_bytes(Bytes::copy_from_slice(parameters));
        sign_interest(&mut interest, &self.key)?;
        Ok(interest)
    }

    /// Create a signed Data for `uri` carrying `content`.
    pub fn make_signed_data(&self, uri: &str, content: &[u8]) -> Result<Data, SecurityError> {
        let name: Name = uri.parse().map_err(ndnwire_core::Error::from)?;
        let mut data = Data::new(name);
        data.set_content_bytes(Bytes::copy_from_slice(content));
        sign_data(&mut data, &self.key)?;
        Ok(data)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndnwire_security::{verify_data, verify_interest};

    #[test]
    fn test_fixture_interest() {
        let fixture = TestFixture::new();
        let interest = fixture.make_signed_interest("/app/op", b"args").unwrap();
        assert!(interest.is_signed());
        assert!(verify_interest(&interest, &fixture.public_key()).unwrap());
    }

    #[test]
    fn test_fixture_data() {
        let fixture = TestFixture::with_seed([9; 32]);
        let data = fixture.make_signed_data("/file/seg=0", b"bytes").unwrap();
        assert!(data.wire().is_some());
        assert!(verify_data(&data, &fixture.key).unwrap());
        assert!(data.full_name().is_ok());
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_fixtures(3);
        let pks: Vec<_> = parties.iter().map(|p| p.public_key()).collect();
        assert_ne!(pks[0], pks[1]);
        assert_ne!(pks[1], pks[2]);
        assert_ne!(pks[0], pks[2]);

        let data = parties[0].make_signed_data("/x", b"").unwrap();
        assert!(!verify_data(&data, &parties[1].key).unwrap());
    }
}
