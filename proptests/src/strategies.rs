//! Shared proptest strategies and helpers for por-core tests.
//!
//! This module provides reusable strategies for generating:
//! - File data of bounded size
//! - PRF keys
//! - Big integers and the wire-format protocol values built from them
//!
//! Prime generation is slow, so protocol tests share one 128-bit verifier
//! per process instead of sampling a fresh one per case.

use std::sync::OnceLock;

use num_bigint::BigUint;
use por_core::{Challenge, Por, PrfKey, Proof, Tag};
use proptest::prelude::*;

/// Shared 128-bit verifier (4 sectors of 2 bytes, 8-byte chunks).
pub fn fixture_verifier() -> &'static Por {
    static VERIFIER: OnceLock<Por> = OnceLock::new();
    VERIFIER.get_or_init(|| Por::gen(128, 4).expect("fixture verifier"))
}

/// Generate random file data within a size range.
pub fn file_data_strategy(min_size: usize, max_size: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), min_size..=max_size)
}

/// Generate a 32-byte PRF key.
pub fn prf_key_strategy() -> impl Strategy<Value = PrfKey> {
    prop::array::uniform32(any::<u8>()).prop_map(PrfKey::from_bytes)
}

/// Generate a big integer of up to `max_bytes` big-endian bytes.
pub fn biguint_strategy(max_bytes: usize) -> impl Strategy<Value = BigUint> {
    prop::collection::vec(any::<u8>(), 0..=max_bytes)
        .prop_map(|bytes| BigUint::from_bytes_be(&bytes))
}

/// Generate a nonzero big integer of up to `max_bytes` big-endian bytes.
pub fn nonzero_biguint_strategy(max_bytes: usize) -> impl Strategy<Value = BigUint> {
    biguint_strategy(max_bytes).prop_map(|n| n + 1u32)
}

/// Generate a tag with up to 64 authenticators.
pub fn tag_strategy() -> impl Strategy<Value = Tag> {
    prop::collection::vec(biguint_strategy(20), 0..64).prop_map(|sigma| Tag { sigma })
}

/// Generate a structurally valid challenge.
pub fn challenge_strategy() -> impl Strategy<Value = Challenge> {
    (1u32..10_000, prf_key_strategy(), nonzero_biguint_strategy(20))
        .prop_map(|(l, key, bound)| Challenge::new(l, key, bound))
}

/// Generate a proof with up to 32 sector responses.
pub fn proof_strategy() -> impl Strategy<Value = Proof> {
    (
        prop::collection::vec(biguint_strategy(20), 0..32),
        biguint_strategy(20),
    )
        .prop_map(|(mu, sigma)| Proof { mu, sigma })
}

/// Byte length of a fixture-verifier chunk.
pub fn fixture_chunk_bytes() -> usize {
    let por = fixture_verifier();
    (por.sectors() * por.sector_size()) as usize
}
