//! # ndnwire Core
//!
//! TLV primitives for the named-data-networking packet format.
//!
//! This crate contains:
//! - VarNumber and nonNegativeInteger codecs
//! - [`Block`]: a TLV element that views a shared buffer without copying
//! - Two-pass (estimate, then emit back to front) encoding
//! - TLV-TYPE constants and the critical-type rule
//! - Error categories and the process-wide [`WireConfig`]
//!
//! This crate performs no I/O.

pub mod block;
pub mod config;
pub mod encoder;
pub mod error;
pub mod tlv;
pub mod varnum;

pub use block::Block;
pub use config::{Convention, ConventionDecoding, UriFormat, WireConfig};
pub use encoder::{Encoder, EncodingBuffer, Estimator, TlvEncode};
pub use error::{ConstructionError, DecodeError, Error, PreconditionError, Result};
pub use varnum::{
    decode_non_negative_integer, decode_type, decode_var_number, encode_non_negative_integer,
    encode_var_number, var_number_size,
};

/// Re-export of the shared buffer type used throughout the API.
pub use bytes::Bytes;
