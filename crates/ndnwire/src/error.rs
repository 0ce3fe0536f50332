//! Error types for the ndnwire API.

use thiserror::Error;

use ndnwire_core::{ConstructionError, DecodeError, PreconditionError};
use ndnwire_security::SecurityError;

/// Any error raised through the unified API.
#[derive(Debug, Error)]
pub enum NdnError {
    /// Encoding, decoding or packet-state error.
    #[error("wire error: {0}")]
    Wire(#[from] ndnwire_core::Error),

    /// Signing or verification error.
    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    /// The outer element is neither an Interest nor a Data.
    #[error("not a packet: TLV-TYPE {0}")]
    NotAPacket(u32),
}

impl NdnError {
    /// Whether the error came from malformed input.
    pub fn is_decode(&self) -> bool {
        match self {
            Self::Wire(e) => e.is_decode(),
            Self::Security(SecurityError::Wire(e)) => e.is_decode(),
            Self::NotAPacket(_) => true,
            Self::Security(_) => false,
        }
    }
}

impl From<DecodeError> for NdnError {
    fn from(e: DecodeError) -> Self {
        Self::Wire(e.into())
    }
}

impl From<ConstructionError> for NdnError {
    fn from(e: ConstructionError) -> Self {
        Self::Wire(e.into())
    }
}

impl From<PreconditionError> for NdnError {
    fn from(e: PreconditionError) -> Self {
        Self::Wire(e.into())
    }
}

/// Result type for the unified API.
pub type Result<T> = std::result::Result<T, NdnError>;
