//! Property-based tests for protocol soundness.
//!
//! Tests the following invariants:
//! - POR-1: An honest prover is always accepted
//! - POR-2: Corrupting a challenged authenticator fails verification
//! - POR-3: Corrupting a challenged file byte fails verification
//! - POR-4: Any bit flip in a sealed state blob is rejected
//! - POR-5: The public form proves but cannot challenge or verify

#![allow(unused_imports)]
use crate::strategies::*;
use num_traits::ToPrimitive;
use por_core::{Challenge, PorError, Serializable, State};
use proptest::prelude::*;
use std::io::Cursor;

/// Chunk indices a challenge samples, given the file's chunk count.
fn challenged_chunks(challenge: &Challenge, n: u32) -> Vec<u32> {
    let index = challenge.index_prf(n).expect("nonzero chunk count");
    (0..challenge.l())
        .map(|t| index.eval(t).to_u32().expect("index below chunk count"))
        .collect()
}

/// Draw challenges until one covers `chunk` (sampling is with replacement,
/// so a single challenge misses any fixed chunk with probability about
/// 1/e).
fn covering_challenge(por: &por_core::Por, state: &State, chunk: u32) -> Challenge {
    let n = state.chunk_count().expect("sealed state");
    (0..64)
        .map(|_| por.gen_challenge(state).expect("challenge"))
        .find(|c| challenged_chunks(c, n).contains(&chunk))
        .expect("a covering challenge within 64 draws")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// POR-1: encode / challenge / prove / verify accepts honest provers.
    #[test]
    fn prop_honest_prover_accepted(data in file_data_strategy(1, 2048)) {
        let por = fixture_verifier();
        let (tag, state) = por.encode(&mut Cursor::new(&data)).unwrap();
        prop_assert!(state.is_sealed());
        prop_assert_eq!(tag.sigma.len() as u32, state.chunk_count().unwrap());
        prop_assert!(tag.sigma.iter().all(|s| s < por.prime()));

        let challenge = por.gen_challenge(&state).unwrap();
        let proof = por.prove(&mut Cursor::new(&data), &challenge, &tag).unwrap();
        prop_assert!(por.verify(&proof, &challenge, &state).unwrap());
    }

    /// POR-2: a corrupted, challenged authenticator is detected.
    #[test]
    fn prop_tag_corruption_detected(data in file_data_strategy(1, 1024)) {
        let por = fixture_verifier();
        let (tag, state) = por.encode(&mut Cursor::new(&data)).unwrap();
        let n = state.chunk_count().unwrap();

        let challenge = por.gen_challenge(&state).unwrap();
        let target = challenged_chunks(&challenge, n)[0] as usize;
        let mut forged = tag.clone();
        forged.sigma[target] = (&forged.sigma[target] + 1u32) % por.prime();

        let proof = por.prove(&mut Cursor::new(&data), &challenge, &forged).unwrap();
        prop_assert!(!por.verify(&proof, &challenge, &state).unwrap());
    }

    /// POR-3: a flipped file byte in a challenged chunk is detected.
    #[test]
    fn prop_file_corruption_detected(
        data in file_data_strategy(1, 1024),
        flip_seed in any::<prop::sample::Index>(),
    ) {
        let por = fixture_verifier();
        let (tag, state) = por.encode(&mut Cursor::new(&data)).unwrap();

        let flip_at = flip_seed.index(data.len());
        let chunk = (flip_at / fixture_chunk_bytes()) as u32;
        let challenge = covering_challenge(por, &state, chunk);

        let mut corrupted = data.clone();
        corrupted[flip_at] ^= 0x01;
        let proof = por.prove(&mut Cursor::new(&corrupted), &challenge, &tag).unwrap();
        prop_assert!(!por.verify(&proof, &challenge, &state).unwrap());
    }

    /// POR-4: flipping any byte of a sealed state blob (past the outer
    /// length prefix) fails challenge generation and verification.
    #[test]
    fn prop_state_bit_flip_rejected(
        data in file_data_strategy(1, 512),
        byte_seed in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let por = fixture_verifier();
        let (tag, state) = por.encode(&mut Cursor::new(&data)).unwrap();
        let challenge = por.gen_challenge(&state).unwrap();
        let proof = por.prove(&mut Cursor::new(&data), &challenge, &tag).unwrap();

        let mut bytes = state.to_bytes().unwrap();
        let flip_at = 4 + byte_seed.index(bytes.len() - 4);
        bytes[flip_at] ^= 1 << bit;
        let tampered = State::from_bytes(&bytes).unwrap();

        prop_assert!(matches!(
            por.gen_challenge(&tampered),
            Err(PorError::StateAuthFailed)
        ));
        prop_assert!(!por.verify(&proof, &challenge, &tampered).unwrap());
    }

    /// POR-5: the public form's proofs are accepted by the private
    /// verifier, and its secret-keyed operations are refused.
    #[test]
    fn prop_public_form_safety(data in file_data_strategy(1, 1024)) {
        let por = fixture_verifier();
        let public = por.get_public();
        let (tag, state) = por.encode(&mut Cursor::new(&data)).unwrap();
        let challenge = por.gen_challenge(&state).unwrap();

        let proof = public.prove(&mut Cursor::new(&data), &challenge, &tag).unwrap();
        prop_assert!(por.verify(&proof, &challenge, &state).unwrap());

        prop_assert!(matches!(
            public.gen_challenge(&state),
            Err(PorError::CapabilityMissing)
        ));
        prop_assert!(matches!(
            public.verify(&proof, &challenge, &state),
            Err(PorError::CapabilityMissing)
        ));
    }
}

/// Proofs agree between a verifier and its serialized round trip.
#[test]
fn test_restored_verifier_interoperates() {
    use por_core::Por;

    let por = fixture_verifier();
    let data: Vec<u8> = (0..512u32).map(|i| (i % 256) as u8).collect();
    let (tag, state) = por.encode(&mut Cursor::new(&data)).unwrap();

    let restored = Por::from_bytes(&por.to_bytes().unwrap()).unwrap();
    let challenge = restored.gen_challenge(&state).unwrap();
    let proof = restored
        .prove(&mut Cursor::new(&data), &challenge, &tag)
        .unwrap();
    assert!(por.verify(&proof, &challenge, &state).unwrap());
}
