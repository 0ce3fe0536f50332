//! # ndnwire Testkit
//!
//! Testing utilities for ndnwire.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: hand-checked wire encodings paired with builders
//! - **Generators**: proptest strategies for components, names and packets
//! - **Fixtures**: signed packets from deterministic Ed25519 keys
//! - **Tracing**: a once-only subscriber that logs through the test harness
//!
//! ## Golden Vectors
//!
//! ```rust
//! use ndnwire_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, actual) in verify_all_vectors() {
//!     assert!(matches, "{name}: {actual}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use ndnwire_testkit::generators::{interest_from_params, InterestParams};
//!
//! proptest! {
//!     #[test]
//!     fn digest_stays_valid(params: InterestParams) {
//!         prop_assert!(interest_from_params(&params).is_parameters_digest_valid());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod tracing_config;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, TestFixture};
pub use generators::{data_from_params, interest_from_params, DataParams, InterestParams};
pub use tracing_config::init_test_tracing;
pub use vectors::{all_vectors, verify_all_vectors, VectorKind, WireVector};
