//! The Shacham-Waters private proof-of-retrievability engine.
//!
//! A verifier tags a file chunk by chunk (`encode`), hands the file, the
//! tag, and the sealed state to an untrusted server, and later audits it:
//! `gen_challenge` samples a fresh challenge key, the server answers with
//! `prove`, and `verify` checks the aggregate response against the state's
//! PRFs. All arithmetic is mod the verifier's prime `p`.

use core::fmt;
use std::io::{Read, Seek};

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use tracing::{debug, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::codec::{ByteReader, ByteWriter, Serializable};
use crate::error::{PorError, Result};
use crate::field;
use crate::file::ChunkedFile;
use crate::prf::{KeyedPrf, PrfKey, TAG_F};
use crate::state::State;
use crate::types::{Challenge, Proof, Tag};
use crate::{DEFAULT_PRIME_BITS, DEFAULT_SECTORS, KEY_SIZE};

const ZERO_KEY: [u8; KEY_SIZE] = [0u8; KEY_SIZE];

/// Keys sealing the per-file state, zeroed on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
struct SealKeys {
    k_enc: [u8; KEY_SIZE],
    k_mac: [u8; KEY_SIZE],
}

/// A proof-of-retrievability verifier.
///
/// The private form holds the state seal keys and can run every operation.
/// The public form ([`Por::get_public`]) has no seal keys: it can still
/// `encode` and `prove`, but refuses `gen_challenge` and `verify`.
#[derive(Clone, PartialEq, Eq)]
pub struct Por {
    p: BigUint,
    sectors: u32,
    sector_size: u32,
    keys: Option<SealKeys>,
}

impl Por {
    /// Create a verifier with a fresh random prime of `prime_bits` bits and
    /// fresh seal keys.
    ///
    /// The sector size is fixed at `bytelen(p) / 8` so a sector always
    /// encodes an integer strictly below `p`; a malicious server cannot
    /// shrink sectors undetectably. `prime_bits` below 64 would make that
    /// zero and is rejected.
    pub fn gen(prime_bits: usize, sectors: u32) -> Result<Self> {
        if sectors == 0 {
            return Err(PorError::param("sector count must be nonzero"));
        }
        if prime_bits < 64 {
            return Err(PorError::param(
                "prime bit length below 64 leaves no room for a sector",
            ));
        }
        let p = field::random_prime(prime_bits)?;
        let sector_size = (field::byte_len(&p) / 8) as u32;
        let keys = SealKeys {
            k_enc: field::random_bytes()?,
            k_mac: field::random_bytes()?,
        };
        debug!(prime_bits, sectors, sector_size, "generated verifier");
        Ok(Self {
            p,
            sectors,
            sector_size,
            keys: Some(keys),
        })
    }

    /// Create a verifier with the default parameters (1024-bit prime, 10
    /// sectors per chunk).
    pub fn gen_default() -> Result<Self> {
        Self::gen(DEFAULT_PRIME_BITS, DEFAULT_SECTORS)
    }

    /// The public form: same parameters, no seal keys.
    pub fn get_public(&self) -> Self {
        Self {
            p: self.p.clone(),
            sectors: self.sectors,
            sector_size: self.sector_size,
            keys: None,
        }
    }

    pub fn is_private(&self) -> bool {
        self.keys.is_some()
    }

    /// The field prime `p`.
    pub fn prime(&self) -> &BigUint {
        &self.p
    }

    /// Sectors per chunk.
    pub fn sectors(&self) -> u32 {
        self.sectors
    }

    /// Bytes per sector.
    pub fn sector_size(&self) -> u32 {
        self.sector_size
    }

    fn seal_keys(&self) -> (&[u8; KEY_SIZE], &[u8; KEY_SIZE]) {
        match &self.keys {
            Some(keys) => (&keys.k_enc, &keys.k_mac),
            None => (&ZERO_KEY, &ZERO_KEY),
        }
    }

    /// Tag a file: one authenticator per chunk plus a sealed state.
    ///
    /// `sigma[i] = f(i) + sum_j alpha(j) * sector(i, j)  (mod p)` under two
    /// fresh PRF keys, which are then sealed into the returned state. The
    /// public form seals under all-zero keys, so its states authenticate
    /// under no real key while its tags remain interchangeable.
    pub fn encode<F: Read + Seek>(&self, source: &mut F) -> Result<(Tag, State)> {
        let mut view = ChunkedFile::new(source, self.sectors, self.sector_size)?;
        let chunks = view.chunk_count();
        let n = u32::try_from(chunks)
            .map_err(|_| PorError::param(format!("file has {chunks} chunks, limit is 2^32-1")))?;
        debug!(n, sectors = self.sectors, "encoding file");

        let f_key = PrfKey::random()?;
        let alpha_key = PrfKey::random()?;
        let prf_f = KeyedPrf::new(f_key.clone(), self.p.clone(), TAG_F)?;
        let alphas = self.sector_coefficients(&alpha_key)?;

        let mut sigma = Vec::with_capacity(n as usize);
        for i in 0..n {
            let mut acc = prf_f.eval(i);
            for (j, alpha) in alphas.iter().enumerate() {
                acc += alpha * view.get_sector(i, j as u32)?;
                acc %= &self.p;
            }
            sigma.push(acc);
        }

        let mut state = State::new(n, f_key, alpha_key);
        let (k_enc, k_mac) = self.seal_keys();
        state.encrypt_and_sign(k_enc, k_mac)?;
        Ok((Tag { sigma }, state))
    }

    /// Challenge every chunk of the file described by `state`, with the
    /// coefficient bound set to `p`.
    pub fn gen_challenge(&self, state: &State) -> Result<Challenge> {
        let n = state.chunk_count()?;
        self.gen_challenge_with(state, n, self.p.clone())
    }

    /// Challenge `l` chunks with coefficients below `bound`.
    ///
    /// Smaller `l` trades audit coverage for proof work; smaller `bound`
    /// trades soundness margin for response size. The state is
    /// authenticated and decrypted first; a forged or corrupted state is
    /// `StateAuthFailed`.
    pub fn gen_challenge_with(&self, state: &State, l: u32, bound: BigUint) -> Result<Challenge> {
        let keys = self.keys.as_ref().ok_or(PorError::CapabilityMissing)?;
        let opened = state.check_and_decrypt(&keys.k_enc, &keys.k_mac)?;
        let n = opened.chunk_count()?;
        if l == 0 || l > n {
            return Err(PorError::param(format!(
                "challenge size {l} outside [1, {n}]"
            )));
        }
        if bound.is_zero() || bound > self.p {
            return Err(PorError::param("coefficient bound outside (0, p]"));
        }
        let key = PrfKey::random()?;
        debug!(l, n, "generated challenge");
        Ok(Challenge::new(l, key, bound))
    }

    /// Answer a challenge from the file and its tag.
    ///
    /// `mu[j] = sum_t coef(t) * sector(idx(t), j)` and
    /// `sigma = sum_t coef(t) * tag.sigma[idx(t)]`, all mod `p`. The index
    /// PRF is bounded by the file's chunk count, which must match the tag.
    pub fn prove<F: Read + Seek>(
        &self,
        source: &mut F,
        challenge: &Challenge,
        tag: &Tag,
    ) -> Result<Proof> {
        let mut view = ChunkedFile::new(source, self.sectors, self.sector_size)?;
        let chunks = view.chunk_count();
        let n = u32::try_from(chunks)
            .map_err(|_| PorError::param(format!("file has {chunks} chunks, limit is 2^32-1")))?;
        if tag.sigma.len() != n as usize {
            return Err(PorError::TagShapeMismatch {
                expected: n,
                actual: tag.sigma.len(),
            });
        }
        if let Some(bad) = tag.sigma.iter().position(|s| s >= &self.p) {
            return Err(PorError::wire(format!(
                "tag authenticator {bad} not reduced mod p"
            )));
        }
        debug!(l = challenge.l(), n, "proving retrievability");

        let index = challenge.index_prf(n)?;
        let coef = challenge.coef_prf()?;
        let draws: Vec<(u32, BigUint)> = (0..challenge.l())
            .map(|t| {
                let i = index
                    .eval(t)
                    .to_u32()
                    .expect("index PRF output is below the chunk count");
                (i, coef.eval(t))
            })
            .collect();

        let mut mu = Vec::with_capacity(self.sectors as usize);
        for j in 0..self.sectors {
            let mut acc = BigUint::zero();
            for (i, v) in &draws {
                acc += v * view.get_sector(*i, j)?;
                acc %= &self.p;
            }
            mu.push(acc);
        }

        let mut sigma = BigUint::zero();
        for (i, v) in &draws {
            sigma += v * &tag.sigma[*i as usize];
            sigma %= &self.p;
        }

        Ok(Proof { mu, sigma })
    }

    /// Check a proof against a challenge and the file's sealed state.
    ///
    /// Returns `Ok(false)` when the proof does not match or the state fails
    /// authentication (both are expected protocol outcomes); malformed
    /// rounds surface as errors.
    pub fn verify(&self, proof: &Proof, challenge: &Challenge, state: &State) -> Result<bool> {
        let keys = self.keys.as_ref().ok_or(PorError::CapabilityMissing)?;
        let opened = match state.check_and_decrypt(&keys.k_enc, &keys.k_mac) {
            Ok(opened) => opened,
            Err(PorError::StateAuthFailed) => {
                warn!("state failed authentication, rejecting proof");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        if proof.mu.len() != self.sectors as usize {
            return Err(PorError::ProofShapeMismatch {
                expected: self.sectors,
                actual: proof.mu.len(),
            });
        }
        if proof.sigma >= self.p || proof.mu.iter().any(|m| m >= &self.p) {
            return Err(PorError::wire("proof response not reduced mod p"));
        }

        let n = opened.chunk_count()?;
        let index = challenge.index_prf(n)?;
        let coef = challenge.coef_prf()?;
        let prf_f = opened.prf_f(&self.p)?;
        let prf_alpha = opened.prf_alpha(&self.p)?;
        debug!(l = challenge.l(), n, "verifying proof");

        let mut rhs = BigUint::zero();
        for t in 0..challenge.l() {
            let i = index
                .eval(t)
                .to_u32()
                .expect("index PRF output is below the chunk count");
            rhs += coef.eval(t) * prf_f.eval(i);
            rhs %= &self.p;
        }
        for (j, m) in proof.mu.iter().enumerate() {
            rhs += prf_alpha.eval(j as u32) * m;
            rhs %= &self.p;
        }

        Ok(proof.sigma == rhs)
    }

    fn sector_coefficients(&self, alpha_key: &PrfKey) -> Result<Vec<BigUint>> {
        let prf = KeyedPrf::new(alpha_key.clone(), self.p.clone(), crate::prf::TAG_ALPHA)?;
        Ok((0..self.sectors).map(|j| prf.eval(j)).collect())
    }
}

impl fmt::Debug for Por {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Por")
            .field("prime_bits", &self.p.bits())
            .field("sectors", &self.sectors)
            .field("sector_size", &self.sector_size)
            .field("form", &if self.is_private() { "private" } else { "public" })
            .finish()
    }
}

impl Serializable for Por {
    fn write(&self, w: &mut ByteWriter) -> Result<()> {
        match &self.keys {
            Some(keys) => {
                w.put_bytes(&keys.k_enc);
                w.put_bytes(&keys.k_mac);
            }
            None => {
                w.put_bytes(&[]);
                w.put_bytes(&[]);
            }
        }
        w.put_u32(self.sectors);
        w.put_u32(self.sector_size);
        w.put_bigint(&self.p);
        Ok(())
    }

    fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        let k_enc = r.read_bytes()?;
        let k_mac = r.read_bytes()?;
        let keys = match (k_enc.len(), k_mac.len()) {
            (0, 0) => None,
            (KEY_SIZE, KEY_SIZE) => Some(SealKeys {
                k_enc: k_enc.try_into().expect("length checked"),
                k_mac: k_mac.try_into().expect("length checked"),
            }),
            (len, KEY_SIZE) | (_, len) => {
                return Err(PorError::KeyIncompatible {
                    len,
                    expected: KEY_SIZE,
                })
            }
        };
        let sectors = r.read_u32()?;
        let sector_size = r.read_u32()?;
        let p = r.read_bigint()?;
        if sectors == 0 || sector_size == 0 {
            return Err(PorError::wire("verifier geometry must be nonzero"));
        }
        if u64::from(sector_size) * 8 >= p.bits() {
            return Err(PorError::wire("sector size incompatible with modulus"));
        }
        Ok(Self {
            p,
            sectors,
            sector_size,
            keys,
        })
    }
}
