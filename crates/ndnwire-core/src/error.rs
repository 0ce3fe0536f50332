//! Error types for the TLV core.
//!
//! Failures fall into three categories:
//!
//! - [`DecodeError`]: the input bytes are malformed, truncated, out of order,
//!   or carry an unrecognized critical element.
//! - [`ConstructionError`]: a caller-supplied value violates an invariant.
//!   The target object is left untouched.
//! - [`PreconditionError`]: an operation was invoked in the wrong state.
//!   Every such case has a documented predicate the caller can check first.

use thiserror::Error;

/// Malformed or unacceptable wire input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("insufficient input: need {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("illegal TLV-TYPE {0}")]
    IllegalType(u64),

    #[error("TLV-LENGTH {length} of element type {tlv_type} exceeds the {remaining} remaining bytes")]
    LengthOverflow {
        tlv_type: u32,
        length: u64,
        remaining: usize,
    },

    #[error("TLV-LENGTH does not match buffer size: element is {element} bytes, buffer is {buffer}")]
    LengthMismatch { element: usize, buffer: usize },

    #[error("expecting TLV-TYPE {expected}, got {actual}")]
    UnexpectedType { expected: u32, actual: u32 },

    #[error("{0} element is out of order")]
    OutOfOrder(&'static str),

    #[error("unrecognized element of critical type {0}")]
    UnrecognizedCritical(u32),

    #[error("{0} element is missing")]
    Missing(&'static str),

    #[error("{element} element is malformed: {reason}")]
    Malformed {
        element: &'static str,
        reason: String,
    },

    #[error("invalid length {0} for nonNegativeInteger (only 1, 2, 4, and 8 are allowed)")]
    NonNegativeIntegerLength(usize),

    #[error("ParametersSha256DigestComponent does not match the SHA-256 of Interest parameters")]
    ParametersDigestMismatch,

    #[error("invalid name component: {0}")]
    InvalidComponent(#[from] ConstructionError),
}

impl DecodeError {
    /// Shorthand for [`DecodeError::Malformed`].
    pub fn malformed(element: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            element,
            reason: reason.into(),
        }
    }
}

/// A caller-supplied value violates an invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("TLV-TYPE {0} is not a valid NameComponent")]
    InvalidComponentType(u32),

    #[error("{kind} requires a {expected}-byte value, got {actual}")]
    DigestLength {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("name cannot have more than one ParametersSha256DigestComponent")]
    MultipleParametersDigests,

    #[error("AppMetaInfo block has type {0} outside the application range [128, 252]")]
    AppMetaInfoType(u32),

    #[error("illegal URI: {0}")]
    InvalidUri(String),

    #[error("unsupported naming convention: {0}")]
    Convention(&'static str),

    #[error("block is not valid: {0}")]
    InvalidBlock(&'static str),

    #[error("expecting a block of TLV-TYPE {expected}, got {actual}")]
    WrongBlockType { expected: u32, actual: u32 },

    #[error("name component index {index} is out of range for a name of {len} components")]
    IndexOutOfRange { index: isize, len: usize },
}

/// An operation was invoked in the wrong state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("no sub-element of type {child} in block of type {parent}")]
    NoSuchElement { parent: u32, child: u32 },

    #[error("sub-element index {index} out of range for {len} elements")]
    ElementIndexOutOfRange { index: usize, len: usize },

    #[error("InterestSignatureInfo must be present to set InterestSignatureValue")]
    SignatureInfoRequired,

    #[error("Interest name must end with a ParametersSha256DigestComponent")]
    MissingParametersDigest,

    #[error("Interest is missing InterestSignatureInfo")]
    MissingSignatureInfo,

    #[error("cannot compute full name because Data has no wire encoding (not signed)")]
    NotEncoded,

    #[error("requested wire format, but Data has not been signed")]
    Unsigned,

    #[error("cannot encode invalid SignatureInfo")]
    InvalidSignatureInfo,

    #[error("unsupported KeyLocator type {0}")]
    UnsupportedKeyLocator(u32),

    #[error("KeyLocator does not contain a {0}")]
    KeyLocatorVariant(&'static str),

    #[error("name component is not a {0}")]
    NotConvention(&'static str),
}

/// Any failure raised by the TLV core and the crates layered on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("construction error: {0}")]
    Construction(#[from] ConstructionError),

    #[error("precondition violated: {0}")]
    Precondition(#[from] PreconditionError),
}

impl Error {
    /// True if this is a [`DecodeError`].
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }

    /// True if this is a [`ConstructionError`].
    pub fn is_construction(&self) -> bool {
        matches!(self, Error::Construction(_))
    }

    /// True if this is a [`PreconditionError`].
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::Precondition(_))
    }
}

/// Result type for TLV operations.
pub type Result<T> = std::result::Result<T, Error>;
