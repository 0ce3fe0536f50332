//! Error types for signing and verification.

use thiserror::Error;

use ndnwire_packet::SignatureType;

/// Errors that can occur while signing or verifying a packet.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// The packet carries no signature to verify.
    #[error("packet is not signed")]
    Unsigned,

    /// The packet's signature type is not the one the verifier checks.
    #[error("signature type mismatch: verifier handles {expected}, packet has {actual}")]
    SignatureTypeMismatch {
        expected: SignatureType,
        actual: SignatureType,
    },

    /// The signature does not verify under the key.
    #[error("invalid signature")]
    InvalidSignature,

    /// Public key bytes do not form a valid key.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Wire-level error from encoding, decoding or packet state.
    #[error("wire error: {0}")]
    Wire(#[from] ndnwire_core::Error),
}

impl From<ndnwire_core::PreconditionError> for SecurityError {
    fn from(e: ndnwire_core::PreconditionError) -> Self {
        Self::Wire(e.into())
    }
}

/// Result type for security operations.
pub type Result<T> = std::result::Result<T, SecurityError>;
