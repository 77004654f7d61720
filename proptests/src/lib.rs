//! Property-based tests for the proof-of-retrievability engine.
//!
//! This crate contains proptest-based property tests for verifying
//! invariants of the por-core protocol.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all property tests
//! cargo test -p proptests
//!
//! # Run with more test cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p proptests
//!
//! # Run specific test module
//! cargo test -p proptests roundtrip
//!
//! # Run single test
//! cargo test -p proptests prop_honest_prover_accepted
//! ```
//!
//! ## Test Categories
//!
//! - **Roundtrip tests**: Wire-format serialization (binary and base64
//!   round trips, deterministic encoding)
//! - **Scheme tests**: Protocol soundness (honest prover accepted, file and
//!   tag corruption detected, sealed-state integrity, public-form safety)

// Re-export por-core for use in test modules
pub use por_core;

/// Shared test strategies and helpers.
pub mod strategies;

// Test modules
#[cfg(test)]
mod roundtrip;
#[cfg(test)]
mod scheme;
