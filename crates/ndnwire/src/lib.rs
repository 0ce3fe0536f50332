//! # ndnwire
//!
//! The TLV wire encoding and packet model of Named Data Networking.
//!
//! ## Overview
//!
//! - **TLV**: VarNumber codec and [`Block`], a TLV element that views a
//!   shared buffer and parses its children on demand
//! - **Names**: typed [`Component`]s under a canonical total order, URI
//!   forms and numeric naming conventions
//! - **Packets**: [`Interest`] and [`Data`], with [`MetaInfo`],
//!   [`SignatureInfo`] and [`KeyLocator`]
//! - **Signing boundary**: packets expose the bytes a signature covers;
//!   [`Signer`] and [`Verifier`] implementations turn them into signatures
//!
//! ## Usage
//!
//! ```rust
//! use ndnwire::prelude::*;
//!
//! let mut interest = Interest::new("/example/data".parse().unwrap()).unwrap();
//! interest.set_can_be_prefix(true);
//! interest.set_application_parameters_bytes(&b"query"[..]);
//! sign_interest(&mut interest, &DigestSha256).unwrap();
//!
//! let wire = interest.wire_encode().unwrap();
//! let decoded = Interest::decode(wire).unwrap();
//! assert!(verify_interest(&decoded, &DigestSha256).unwrap());
//! ```
//!
//! ## Re-exports
//!
//! - `ndnwire::core` - TLV primitives, errors, [`WireConfig`]
//! - `ndnwire::name` - names and components
//! - `ndnwire::packet` - Interest, Data and their elements
//! - `ndnwire::security` - signers and verifiers

pub mod dispatch;
pub mod error;

// Re-export component crates
pub use ndnwire_core as core;
pub use ndnwire_name as name;
pub use ndnwire_packet as packet;
pub use ndnwire_security as security;

pub use dispatch::Packet;
pub use error::{NdnError, Result};

// Re-export commonly used types
pub use ndnwire_core::{
    tlv, Block, Bytes, Convention, ConventionDecoding, Encoder, EncodingBuffer, Estimator,
    TlvEncode, UriFormat, WireConfig,
};
pub use ndnwire_name::{Component, ComponentType, Name, NumberConvention};
pub use ndnwire_packet::{
    ContentType, Data, Interest, KeyLocator, MetaInfo, Nonce, SignatureInfo, SignatureType,
};
pub use ndnwire_security::{
    sign_data, sign_interest, verify_data, verify_interest, DigestSha256, Ed25519Key,
    Ed25519PublicKey, Signer, Verifier,
};

/// The types most programs need.
pub mod prelude {
    pub use crate::{
        sign_data, sign_interest, verify_data, verify_interest, Block, Bytes, Component, Data,
        DigestSha256, Ed25519Key, Interest, Name, NdnError, Packet, Signer, Verifier,
    };
}
