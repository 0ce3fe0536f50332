//! TLV-TYPE numbers of the NDN packet format.
//!
//! These values are part of the wire protocol and must not change.

/// Reserved; a block of this type is "invalid".
pub const INVALID: u32 = 0;

// Packets
pub const INTEREST: u32 = 5;
pub const DATA: u32 = 6;

// Name and components
pub const NAME: u32 = 7;
pub const IMPLICIT_SHA256_DIGEST_COMPONENT: u32 = 1;
pub const PARAMETERS_SHA256_DIGEST_COMPONENT: u32 = 2;
pub const GENERIC_NAME_COMPONENT: u32 = 8;
pub const KEYWORD_NAME_COMPONENT: u32 = 32;
pub const SEGMENT_NAME_COMPONENT: u32 = 50;
pub const BYTE_OFFSET_NAME_COMPONENT: u32 = 52;
pub const VERSION_NAME_COMPONENT: u32 = 54;
pub const TIMESTAMP_NAME_COMPONENT: u32 = 56;
pub const SEQUENCE_NUM_NAME_COMPONENT: u32 = 58;

/// Smallest TLV-TYPE a name component may carry.
pub const NAME_COMPONENT_MIN: u32 = 1;
/// Largest TLV-TYPE a name component may carry.
pub const NAME_COMPONENT_MAX: u32 = 65535;

// Interest
pub const CAN_BE_PREFIX: u32 = 33;
pub const MUST_BE_FRESH: u32 = 18;
pub const FORWARDING_HINT: u32 = 30;
pub const NONCE: u32 = 10;
pub const INTEREST_LIFETIME: u32 = 12;
pub const HOP_LIMIT: u32 = 34;
pub const APPLICATION_PARAMETERS: u32 = 36;
pub const INTEREST_SIGNATURE_INFO: u32 = 44;
pub const INTEREST_SIGNATURE_VALUE: u32 = 46;

// Legacy ForwardingHint delegation encoding
pub const LINK_PREFERENCE: u32 = 30;
pub const LINK_DELEGATION: u32 = 31;

// Data
pub const META_INFO: u32 = 20;
pub const CONTENT: u32 = 21;
pub const SIGNATURE_INFO: u32 = 22;
pub const SIGNATURE_VALUE: u32 = 23;

// MetaInfo
pub const CONTENT_TYPE: u32 = 24;
pub const FRESHNESS_PERIOD: u32 = 25;
pub const FINAL_BLOCK_ID: u32 = 26;

// SignatureInfo
pub const SIGNATURE_TYPE: u32 = 27;
pub const KEY_LOCATOR: u32 = 28;
pub const KEY_DIGEST: u32 = 29;
pub const SIGNATURE_NONCE: u32 = 38;
pub const SIGNATURE_TIME: u32 = 40;
pub const SIGNATURE_SEQ_NUM: u32 = 42;
pub const VALIDITY_PERIOD: u32 = 253;
pub const NOT_BEFORE: u32 = 254;
pub const NOT_AFTER: u32 = 255;

/// First TLV-TYPE of the range reserved for application AppMetaInfo.
pub const APP_META_INFO_MIN: u32 = 128;
/// Last TLV-TYPE of the range reserved for application AppMetaInfo.
pub const APP_META_INFO_MAX: u32 = 252;

/// Whether an unrecognized element of this TLV-TYPE must abort decoding.
///
/// Types 0-31 are always critical; above that, odd types are critical.
pub const fn is_critical_type(tlv_type: u32) -> bool {
    tlv_type <= 31 || (tlv_type & 0x01) == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_types() {
        assert!(is_critical_type(NAME));
        assert!(is_critical_type(SIGNATURE_VALUE));
        assert!(is_critical_type(31));
        assert!(!is_critical_type(32));
        assert!(is_critical_type(33));
        assert!(!is_critical_type(HOP_LIMIT));
        assert!(!is_critical_type(APPLICATION_PARAMETERS));
        assert!(!is_critical_type(INTEREST_SIGNATURE_INFO));
        assert!(is_critical_type(CAN_BE_PREFIX));
        assert!(is_critical_type(253));
        assert!(!is_critical_type(254));
    }
}
