//! Strong types for numeric packet fields.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SignatureType code carried in SignatureInfo.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignatureType(pub u64);

impl SignatureType {
    pub const DIGEST_SHA256: Self = Self(0);
    pub const SHA256_WITH_RSA: Self = Self(1);
    pub const SHA256_WITH_ECDSA: Self = Self(3);
    pub const HMAC_WITH_SHA256: Self = Self(4);
    pub const ED25519: Self = Self(5);
    pub const NULL: Self = Self(200);

    pub const fn code(self) -> u64 {
        self.0
    }

    /// Registered name of the signature type, if any.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::DIGEST_SHA256 => Some("DigestSha256"),
            Self::SHA256_WITH_RSA => Some("SignatureSha256WithRsa"),
            Self::SHA256_WITH_ECDSA => Some("SignatureSha256WithEcdsa"),
            Self::HMAC_WITH_SHA256 => Some("SignatureHmacWithSha256"),
            Self::ED25519 => Some("SignatureEd25519"),
            Self::NULL => Some("NullSignature"),
            _ => None,
        }
    }
}

impl fmt::Debug for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureType({self})")
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Unknown({})", self.0),
        }
    }
}

impl From<u64> for SignatureType {
    fn from(code: u64) -> Self {
        Self(code)
    }
}

/// ContentType code carried in MetaInfo.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentType(pub u64);

impl ContentType {
    pub const BLOB: Self = Self(0);
    pub const LINK: Self = Self(1);
    pub const KEY: Self = Self(2);
    pub const NACK: Self = Self(3);
    pub const MANIFEST: Self = Self(4);
    pub const PREFIX_ANN: Self = Self(5);
    pub const FLIC: Self = Self(1024);

    pub const fn code(self) -> u64 {
        self.0
    }

    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::BLOB => Some("Blob"),
            Self::LINK => Some("Link"),
            Self::KEY => Some("Key"),
            Self::NACK => Some("Nack"),
            Self::MANIFEST => Some("Manifest"),
            Self::PREFIX_ANN => Some("PrefixAnn"),
            Self::FLIC => Some("FLIC"),
            _ => None,
        }
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self::BLOB
    }
}

impl fmt::Debug for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentType({self})")
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

impl From<u64> for ContentType {
    fn from(code: u64) -> Self {
        Self(code)
    }
}

/// A 4-byte Interest nonce.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nonce(pub [u8; 4]);

impl Nonce {
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// A nonce drawn from the thread-local RNG.
    pub fn random() -> Self {
        let mut bytes = [0u8; 4];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut arr = [0u8; 4];
        hex::decode_to_slice(s, &mut arr)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", self.to_hex())
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 4]> for Nonce {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl From<u32> for Nonce {
    /// Big-endian, so `0x01020304` is carried as `01 02 03 04`.
    fn from(n: u32) -> Self {
        Self(n.to_be_bytes())
    }
}

impl TryFrom<&[u8]> for Nonce {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 4] = slice.try_into()?;
        Ok(Self(arr))
    }
}

impl AsRef<[u8]> for Nonce {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
