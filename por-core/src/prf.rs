//! Keyed pseudorandom functions with bounded output.
//!
//! Every pseudorandom quantity in the protocol (per-chunk pad, sector
//! coefficients, challenge indices, challenge coefficients) comes from one
//! construction: HMAC-SHA256 over `tag || be_u32(input) || be_u32(counter)`,
//! reduced into `[0, limit)` by rejection sampling so the output is unbiased.
//! Two logical PRFs over the same key are separated by their ASCII tag.

use core::fmt;

use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use num_traits::Zero;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{PorError, Result};
use crate::field;
use crate::KEY_SIZE;

type HmacSha256 = Hmac<Sha256>;

/// Domain tag of the per-chunk pad PRF.
pub const TAG_F: &str = "f";
/// Domain tag of the per-sector coefficient PRF.
pub const TAG_ALPHA: &str = "alpha";
/// Domain tag of the challenge index PRF.
pub const TAG_INDEX: &str = "index";
/// Domain tag of the challenge coefficient PRF.
pub const TAG_COEF: &str = "coef";

/// A 32-byte PRF key, zeroed on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrfKey([u8; KEY_SIZE]);

impl PrfKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Fresh key from the OS CSPRNG.
    pub fn random() -> Result<Self> {
        Ok(Self(field::random_bytes()?))
    }

    pub(crate) fn zeroed() -> Self {
        Self([0u8; KEY_SIZE])
    }
}

impl fmt::Debug for PrfKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrfKey([redacted])")
    }
}

/// Keyed PRF mapping a 32-bit input into `[0, limit)`.
///
/// Only the key ever travels on the wire; `limit` and `tag` are re-supplied
/// by whichever component instantiates the PRF.
pub struct KeyedPrf {
    key: PrfKey,
    limit: BigUint,
    tag: &'static str,
    width: usize,
    mask: u8,
}

impl KeyedPrf {
    pub fn new(key: PrfKey, limit: BigUint, tag: &'static str) -> Result<Self> {
        if limit.is_zero() {
            return Err(PorError::param("PRF limit must be nonzero"));
        }
        let width = field::byte_len(&limit);
        let mask = field::top_byte_mask(limit.bits());
        Ok(Self {
            key,
            limit,
            tag,
            width,
            mask,
        })
    }

    pub fn limit(&self) -> &BigUint {
        &self.limit
    }

    /// Evaluate the PRF at `input`.
    ///
    /// Draws successive HMAC blocks until a masked `bitlen(limit)`-bit
    /// candidate lands below the limit. Acceptance probability per candidate
    /// exceeds one half, so this terminates after two candidates on average.
    pub fn eval(&self, input: u32) -> BigUint {
        let mut counter = 0u32;
        let mut pool: Vec<u8> = Vec::with_capacity(self.width + 32);
        loop {
            while pool.len() < self.width {
                pool.extend_from_slice(&self.block(input, counter));
                counter += 1;
            }
            let mut candidate: Vec<u8> = pool.drain(..self.width).collect();
            candidate[0] &= self.mask;
            let value = BigUint::from_bytes_be(&candidate);
            if value < self.limit {
                return value;
            }
        }
    }

    fn block(&self, input: u32, counter: u32) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(&self.key.0)
            .expect("HMAC-SHA256 accepts keys of any length");
        mac.update(self.tag.as_bytes());
        mac.update(&input.to_be_bytes());
        mac.update(&counter.to_be_bytes());
        mac.finalize().into_bytes().into()
    }
}

impl fmt::Debug for KeyedPrf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedPrf")
            .field("tag", &self.tag)
            .field("limit_bits", &self.limit.bits())
            .finish_non_exhaustive()
    }
}
