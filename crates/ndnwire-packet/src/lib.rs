//! # ndnwire Packet
//!
//! Interest and Data packets for the named-data-networking packet format.
//!
//! ## Key Types
//!
//! - [`Interest`] - a request for named data; keeps its
//!   ParametersSha256DigestComponent in step with its parameters
//! - [`Data`] - named content with MetaInfo and a signature
//! - [`MetaInfo`] - content type, freshness period, final block id
//! - [`SignatureInfo`] - signature type, [`KeyLocator`] and extensions
//!
//! Both packet types cache their last wire encoding. Any setter drops the
//! cache; the next `wire_encode` rebuilds it.

pub mod data;
pub mod interest;
pub mod key_locator;
pub mod meta_info;
pub mod signature_info;
pub mod types;

pub use data::Data;
pub use interest::{Interest, DEFAULT_INTEREST_LIFETIME};
pub use key_locator::KeyLocator;
pub use meta_info::MetaInfo;
pub use signature_info::{SignatureInfo, SignatureInfoKind};
pub use types::{ContentType, Nonce, SignatureType};
