//! The signing boundary.
//!
//! Packets expose the byte ranges a signature covers; a [`Signer`] turns
//! those ranges into a SignatureValue and a [`Verifier`] checks one.

use bytes::Bytes;

use ndnwire_packet::{KeyLocator, SignatureType};

/// Produces signatures over signed byte ranges.
pub trait Signer {
    /// SignatureType recorded in the packet's SignatureInfo.
    fn signature_type(&self) -> SignatureType;

    /// KeyLocator recorded in the packet's SignatureInfo, if any.
    fn key_locator(&self) -> Option<KeyLocator> {
        None
    }

    /// Sign the concatenation of `ranges`.
    fn sign(&self, ranges: &[Bytes]) -> Bytes;
}

/// Checks signatures over signed byte ranges.
pub trait Verifier {
    fn signature_type(&self) -> SignatureType;

    /// Whether `signature` is valid over the concatenation of `ranges`.
    fn verify(&self, ranges: &[Bytes], signature: &[u8]) -> bool;
}
