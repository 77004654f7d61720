//! Tag, challenge, and proof values exchanged each audit round.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::codec::{ByteReader, ByteWriter, Serializable};
use crate::error::{PorError, Result};
use crate::prf::{KeyedPrf, PrfKey, TAG_COEF, TAG_INDEX};
use crate::KEY_SIZE;

/// Per-file authenticators, one per chunk, held by the server with the file.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Tag {
    pub sigma: Vec<BigUint>,
}

impl Serializable for Tag {
    fn write(&self, w: &mut ByteWriter) -> Result<()> {
        w.put_u32(self.sigma.len() as u32);
        for sigma in &self.sigma {
            w.put_bigint(sigma);
        }
        Ok(())
    }

    fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        let n = r.read_u32()? as usize;
        // Cap preallocation by what the buffer could actually hold.
        let mut sigma = Vec::with_capacity(n.min(r.remaining() / 4));
        for _ in 0..n {
            sigma.push(r.read_bigint()?);
        }
        Ok(Self { sigma })
    }
}

/// One audit round's challenge: how many chunks to sample, the PRF key that
/// drives the sampling, and the coefficient bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Challenge {
    l: u32,
    key: PrfKey,
    bound: BigUint,
}

impl Challenge {
    pub fn new(l: u32, key: PrfKey, bound: BigUint) -> Self {
        Self { l, key, bound }
    }

    /// Number of challenged chunks.
    pub fn l(&self) -> u32 {
        self.l
    }

    /// Coefficient bound `B`.
    pub fn bound(&self) -> &BigUint {
        &self.bound
    }

    /// The index PRF over `[0, chunk_count)`.
    ///
    /// The limit is re-supplied at use time because it deliberately does not
    /// travel on the wire; the prover uses the file's chunk count and the
    /// verifier uses the state's.
    pub fn index_prf(&self, chunk_count: u32) -> Result<KeyedPrf> {
        KeyedPrf::new(self.key.clone(), BigUint::from(chunk_count), TAG_INDEX)
    }

    /// The coefficient PRF over `[0, B)`.
    pub fn coef_prf(&self) -> Result<KeyedPrf> {
        KeyedPrf::new(self.key.clone(), self.bound.clone(), TAG_COEF)
    }
}

impl Serializable for Challenge {
    fn write(&self, w: &mut ByteWriter) -> Result<()> {
        w.put_u32(self.l);
        w.put_bytes(self.key.as_bytes());
        w.put_bigint(&self.bound);
        Ok(())
    }

    fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        let l = r.read_u32()?;
        let key_bytes = r.read_bytes()?;
        let key: [u8; KEY_SIZE] = key_bytes
            .try_into()
            .map_err(|_| PorError::wire(format!("challenge key length {}", key_bytes.len())))?;
        let bound = r.read_bigint()?;
        if bound.is_zero() {
            return Err(PorError::wire("challenge coefficient bound is zero"));
        }
        Ok(Self {
            l,
            key: PrfKey::from_bytes(key),
            bound,
        })
    }
}

/// Aggregated proof: one sector response per sector plus the combined
/// authenticator response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof {
    pub mu: Vec<BigUint>,
    pub sigma: BigUint,
}

impl Serializable for Proof {
    fn write(&self, w: &mut ByteWriter) -> Result<()> {
        w.put_u32(self.mu.len() as u32);
        for mu in &self.mu {
            w.put_bigint(mu);
        }
        w.put_bigint(&self.sigma);
        Ok(())
    }

    fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        let s = r.read_u32()? as usize;
        let mut mu = Vec::with_capacity(s.min(r.remaining() / 4));
        for _ in 0..s {
            mu.push(r.read_bigint()?);
        }
        let sigma = r.read_bigint()?;
        Ok(Self { mu, sigma })
    }
}
