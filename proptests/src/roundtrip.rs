//! Property-based tests for wire-format serialization.
//!
//! Tests the following invariants:
//! - RT-1: deserialize(serialize(v)) == v for every serializable type
//! - RT-2: serialize is deterministic given the value
//! - RT-3: base64 serialization equals base64 of the binary serialization
//! - RT-4: trailing bytes after a top-level value are rejected

#![allow(unused_imports)]
use crate::strategies::*;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use por_core::{Challenge, Por, Proof, Serializable, State, Tag};
use proptest::prelude::*;
use std::io::Cursor;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// RT-1/RT-2 for tags.
    #[test]
    fn prop_tag_round_trip(tag in tag_strategy()) {
        let bytes = tag.to_bytes().unwrap();
        prop_assert_eq!(&bytes, &tag.to_bytes().unwrap(), "serialization must be deterministic");
        let back = Tag::from_bytes(&bytes).unwrap();
        prop_assert_eq!(back, tag);
    }

    /// RT-3 for tags.
    #[test]
    fn prop_tag_base64_round_trip(tag in tag_strategy()) {
        let b64 = tag.to_base64().unwrap();
        prop_assert_eq!(&b64, &STANDARD.encode(tag.to_bytes().unwrap()));
        prop_assert_eq!(Tag::from_base64(&b64).unwrap(), tag);
    }

    /// RT-1/RT-2 for challenges.
    #[test]
    fn prop_challenge_round_trip(chal in challenge_strategy()) {
        let bytes = chal.to_bytes().unwrap();
        prop_assert_eq!(&bytes, &chal.to_bytes().unwrap());
        let back = Challenge::from_bytes(&bytes).unwrap();
        prop_assert_eq!(back, chal);
    }

    /// RT-3 for challenges.
    #[test]
    fn prop_challenge_base64_round_trip(chal in challenge_strategy()) {
        let b64 = chal.to_base64().unwrap();
        prop_assert_eq!(&b64, &STANDARD.encode(chal.to_bytes().unwrap()));
        prop_assert_eq!(Challenge::from_base64(&b64).unwrap(), chal);
    }

    /// RT-1/RT-2 for proofs.
    #[test]
    fn prop_proof_round_trip(proof in proof_strategy()) {
        let bytes = proof.to_bytes().unwrap();
        prop_assert_eq!(&bytes, &proof.to_bytes().unwrap());
        let back = Proof::from_bytes(&bytes).unwrap();
        prop_assert_eq!(back, proof);
    }

    /// RT-3 for proofs.
    #[test]
    fn prop_proof_base64_round_trip(proof in proof_strategy()) {
        let b64 = proof.to_base64().unwrap();
        prop_assert_eq!(&b64, &STANDARD.encode(proof.to_bytes().unwrap()));
        prop_assert_eq!(Proof::from_base64(&b64).unwrap(), proof);
    }

    /// RT-4: a trailing byte makes every decoder fail.
    #[test]
    fn prop_trailing_byte_rejected(tag in tag_strategy(), trailer in any::<u8>()) {
        let mut bytes = tag.to_bytes().unwrap();
        bytes.push(trailer);
        prop_assert!(Tag::from_bytes(&bytes).is_err());
    }

    /// RT-1/RT-3 for sealed states, derived from real encodings.
    #[test]
    fn prop_state_round_trip(data in file_data_strategy(1, 256)) {
        let por = fixture_verifier();
        let (_, state) = por.encode(&mut Cursor::new(&data)).unwrap();

        let bytes = state.to_bytes().unwrap();
        let back = State::from_bytes(&bytes).unwrap();
        prop_assert_eq!(&back, &state);
        prop_assert_eq!(back.chunk_count().unwrap(), state.chunk_count().unwrap());

        let b64 = state.to_base64().unwrap();
        prop_assert_eq!(&b64, &STANDARD.encode(&bytes));
        prop_assert_eq!(State::from_base64(&b64).unwrap(), state);
    }
}

/// Verifier round trips in both forms (single values, not property cases).
#[test]
fn test_verifier_round_trip_both_forms() {
    let por = fixture_verifier();
    let back = Por::from_bytes(&por.to_bytes().unwrap()).unwrap();
    assert_eq!(&back, por);
    assert!(back.is_private());

    let public = por.get_public();
    let back = Por::from_bytes(&public.to_bytes().unwrap()).unwrap();
    assert_eq!(back, public);
    assert!(!back.is_private());

    let b64 = public.to_base64().unwrap();
    assert_eq!(b64, STANDARD.encode(public.to_bytes().unwrap()));
    assert_eq!(Por::from_base64(&b64).unwrap(), public);
}
