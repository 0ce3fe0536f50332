//! # ndnwire Name
//!
//! Hierarchical names for the named-data-networking packet format.
//!
//! - [`Component`]: a typed name component with the canonical total order
//!   and the `successor` operation
//! - [`Name`]: an ordered sequence of components with URI parsing and
//!   rendering
//! - [`NumberConvention`]: segment, byte offset, version, timestamp and
//!   sequence number components in marker or typed encoding
//! - [`ComponentType`]: per-TLV-TYPE validation, alternate URI syntax and
//!   overflow rules

pub mod component;
pub mod component_type;
pub mod convention;
pub mod escape;
pub mod name;

pub use component::Component;
pub use component_type::{ComponentType, DIGEST_LENGTH};
pub use convention::NumberConvention;
pub use name::Name;
