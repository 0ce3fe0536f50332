//! Naming conventions for numeric name components.
//!
//! Each convention has two encodings: a generic component whose value is a
//! marker octet followed by a nonNegativeInteger, and a dedicated
//! component TLV-TYPE whose value is the bare nonNegativeInteger. Which one
//! is produced and which ones are recognized is set by
//! [`ndnwire_core::WireConfig`].

use ndnwire_core::tlv;

/// A numeric naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberConvention {
    Segment,
    ByteOffset,
    Version,
    /// Microseconds since the Unix epoch.
    Timestamp,
    SequenceNumber,
}

impl NumberConvention {
    pub const ALL: [NumberConvention; 5] = [
        Self::Segment,
        Self::ByteOffset,
        Self::Version,
        Self::Timestamp,
        Self::SequenceNumber,
    ];

    /// Marker octet of the marker encoding.
    pub const fn marker(self) -> u8 {
        match self {
            Self::Segment => 0x00,
            Self::ByteOffset => 0xFB,
            Self::Version => 0xFD,
            Self::Timestamp => 0xFC,
            Self::SequenceNumber => 0xFE,
        }
    }

    /// Component TLV-TYPE of the typed encoding.
    pub const fn tlv_type(self) -> u32 {
        match self {
            Self::Segment => tlv::SEGMENT_NAME_COMPONENT,
            Self::ByteOffset => tlv::BYTE_OFFSET_NAME_COMPONENT,
            Self::Version => tlv::VERSION_NAME_COMPONENT,
            Self::Timestamp => tlv::TIMESTAMP_NAME_COMPONENT,
            Self::SequenceNumber => tlv::SEQUENCE_NUM_NAME_COMPONENT,
        }
    }

    /// Prefix of the alternate URI form, e.g. `seg` in `seg=3`.
    pub const fn uri_prefix(self) -> &'static str {
        match self {
            Self::Segment => "seg",
            Self::ByteOffset => "off",
            Self::Version => "v",
            Self::Timestamp => "t",
            Self::SequenceNumber => "seq",
        }
    }

    /// Human-readable name used in error messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Segment => "segment",
            Self::ByteOffset => "byte offset",
            Self::Version => "version",
            Self::Timestamp => "timestamp",
            Self::SequenceNumber => "sequence number",
        }
    }

    /// The convention whose typed encoding uses `tlv_type`.
    pub fn from_tlv_type(tlv_type: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.tlv_type() == tlv_type)
    }

    /// The convention whose alternate URI prefix is `prefix`.
    pub fn from_uri_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.uri_prefix() == prefix)
    }
}
