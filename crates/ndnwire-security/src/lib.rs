//! # ndnwire Security
//!
//! The signing boundary for ndnwire packets. Packets expose the byte ranges
//! a signature covers; this crate signs and verifies them.
//!
//! - [`Signer`] / [`Verifier`] - the external interface
//! - [`DigestSha256`] - SHA-256 integrity "signature" (type 0)
//! - [`Ed25519Key`] / [`Ed25519PublicKey`] - Ed25519 (type 5)
//! - [`sign_interest`], [`sign_data`], [`verify_interest`], [`verify_data`]

pub mod digest;
pub mod ed25519;
pub mod error;
pub mod packet;
pub mod signer;

pub use digest::DigestSha256;
pub use ed25519::{Ed25519Key, Ed25519PublicKey};
pub use error::{Result, SecurityError};
pub use packet::{sign_data, sign_interest, sign_interest_with_info, verify_data, verify_interest};
pub use signer::{Signer, Verifier};
