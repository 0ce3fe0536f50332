//! Signing and verifying Interest and Data packets.

use bytes::Bytes;
use rand::RngCore;
use std::time::{SystemTime, UNIX_EPOCH};

use ndnwire_core::PreconditionError;
use ndnwire_packet::{Data, Interest, SignatureInfo, SignatureType};

use crate::error::{Result, SecurityError};
use crate::signer::{Signer, Verifier};

/// Length of the SignatureNonce added to signed Interests.
pub const SIGNATURE_NONCE_LENGTH: usize = 8;

fn base_signature_info<S: Signer>(signer: &S) -> SignatureInfo {
    let mut info = SignatureInfo::new(signer.signature_type());
    info.set_key_locator(signer.key_locator());
    info
}

/// Sign an Interest.
///
/// The InterestSignatureInfo carries the signer's type and KeyLocator plus
/// a SignatureTime of now and a random SignatureNonce.
pub fn sign_interest<S: Signer>(interest: &mut Interest, signer: &S) -> Result<()> {
    let mut info = base_signature_info(signer);
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut nonce = [0u8; SIGNATURE_NONCE_LENGTH];
    rand::thread_rng().fill_bytes(&mut nonce);
    info.set_time(Some(now)).set_nonce(Some(Bytes::copy_from_slice(&nonce)));
    sign_interest_with_info(interest, info, signer)
}

/// Sign an Interest with a caller-supplied SignatureInfo.
pub fn sign_interest_with_info<S: Signer>(
    interest: &mut Interest,
    info: SignatureInfo,
    signer: &S,
) -> Result<()> {
    interest.set_signature_info(&info)?;
    let ranges = interest.extract_signed_ranges()?;
    let signature = signer.sign(&ranges);
    interest.set_signature_value(signature)?;
    tracing::debug!(name = %interest.name(), signature_type = %signer.signature_type(), "signed Interest");
    Ok(())
}

/// Sign a Data and return its final wire encoding.
///
/// The signed portion is encoded once and the SignatureValue appended to
/// the same buffer.
pub fn sign_data<S: Signer>(data: &mut Data, signer: &S) -> Result<Bytes> {
    data.set_signature_info(base_signature_info(signer));
    let buffer = data.encode_signed_portion()?;
    let signature = signer.sign(&[Bytes::copy_from_slice(buffer.as_slice())]);
    let wire = data.finalize(buffer, signature)?;
    tracing::debug!(name = %data.name(), signature_type = %signer.signature_type(), "signed Data");
    Ok(wire)
}

fn check_type<V: Verifier>(verifier: &V, actual: Option<SignatureType>) -> Result<()> {
    let actual = actual.ok_or(SecurityError::Unsigned)?;
    if actual != verifier.signature_type() {
        return Err(SecurityError::SignatureTypeMismatch {
            expected: verifier.signature_type(),
            actual,
        });
    }
    Ok(())
}

/// Verify an Interest signature.
///
/// Returns `Ok(false)` only when the signature itself does not verify;
/// missing or mismatched signature metadata is an error.
pub fn verify_interest<V: Verifier>(interest: &Interest, verifier: &V) -> Result<bool> {
    let info = interest
        .signature_info()
        .ok_or(PreconditionError::MissingSignatureInfo)?;
    check_type(verifier, info.signature_type())?;
    let signature = interest.signature_value().ok_or(SecurityError::Unsigned)?;
    let ranges = interest.extract_signed_ranges()?;
    Ok(verifier.verify(&ranges, &signature))
}

/// Verify a Data signature.
pub fn verify_data<V: Verifier>(data: &Data, verifier: &V) -> Result<bool> {
    check_type(verifier, data.signature_type())?;
    let signature = data.signature_value().ok_or(SecurityError::Unsigned)?;
    let ranges = data.extract_signed_ranges()?;
    Ok(verifier.verify(&ranges, &signature))
}
