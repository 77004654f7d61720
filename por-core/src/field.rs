//! Big-integer helpers for the prime field.
//!
//! Everything the scheme needs from arbitrary-precision arithmetic beyond
//! what `num-bigint` provides directly: byte-length bookkeeping, uniform
//! sampling below a bound, and probable-prime generation of a requested bit
//! length. All randomness is drawn from the operating system CSPRNG.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::error::{PorError, Result};

/// Miller-Rabin rounds for probable-prime testing.
const MILLER_RABIN_ROUNDS: usize = 32;

/// Number of bytes in the minimal big-endian encoding of `n`.
///
/// Zero encodes as a single zero byte, matching `BigUint::to_bytes_be`.
pub fn byte_len(n: &BigUint) -> usize {
    if n.is_zero() {
        1
    } else {
        n.bits().div_ceil(8) as usize
    }
}

/// Fill a fixed-size buffer from the OS CSPRNG.
pub fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|_| PorError::RandomnessFailure)?;
    Ok(buf)
}

/// Sample a uniform integer in `[0, bound)`.
///
/// Rejection sampling over `bitlen(bound)`-bit candidates; the expected
/// number of draws is below two.
pub fn random_below(bound: &BigUint) -> Result<BigUint> {
    if bound.is_zero() {
        return Err(PorError::param("sampling bound must be nonzero"));
    }
    let width = byte_len(bound);
    let mask = top_byte_mask(bound.bits());
    loop {
        let mut buf = vec![0u8; width];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|_| PorError::RandomnessFailure)?;
        buf[0] &= mask;
        let candidate = BigUint::from_bytes_be(&buf);
        if &candidate < bound {
            return Ok(candidate);
        }
    }
}

/// Mask for the most significant byte of a `bits`-bit big-endian value.
pub(crate) fn top_byte_mask(bits: u64) -> u8 {
    match bits % 8 {
        0 => 0xff,
        rem => (1u8 << rem) - 1,
    }
}

/// Generate a random probable prime of exactly `bits` bits.
///
/// A random odd candidate with the top bit forced is advanced by two until
/// it passes the primality test; if the search walks past the requested bit
/// length a fresh candidate is drawn.
pub fn random_prime(bits: usize) -> Result<BigUint> {
    if bits < 2 {
        return Err(PorError::param("prime bit length must be at least 2"));
    }
    let len = bits.div_ceil(8);
    let excess = len * 8 - bits;
    loop {
        let mut buf = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|_| PorError::RandomnessFailure)?;
        buf[0] &= 0xff >> excess;
        buf[0] |= 1 << (7 - excess);
        buf[len - 1] |= 1;

        let mut p = BigUint::from_bytes_be(&buf);
        while p.bits() as usize == bits {
            if is_probable_prime(&p)? {
                return Ok(p);
            }
            p += 2u8;
        }
    }
}

/// Probable-prime test: trial division by small primes, then Miller-Rabin.
pub fn is_probable_prime(n: &BigUint) -> Result<bool> {
    let one = BigUint::one();
    let two = BigUint::from(2u8);
    let three = BigUint::from(3u8);

    if n < &two {
        return Ok(false);
    }
    if n == &two || n == &three {
        return Ok(true);
    }
    if (n & &one).is_zero() {
        return Ok(false);
    }

    const SMALL_PRIMES: &[u32] = &[
        3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
        97,
    ];
    for &p in SMALL_PRIMES {
        if n == &BigUint::from(p) {
            return Ok(true);
        }
        if (n % p).is_zero() {
            return Ok(false);
        }
    }

    miller_rabin(n, MILLER_RABIN_ROUNDS)
}

fn miller_rabin(n: &BigUint, rounds: usize) -> Result<bool> {
    let one = BigUint::one();
    let two = BigUint::from(2u8);

    let n_minus_one = n - &one;
    let mut d = n_minus_one.clone();
    let mut s = 0u32;
    while (&d & &one).is_zero() {
        d >>= 1;
        s += 1;
    }

    // Bases drawn uniformly from [2, n-2].
    let base_span = n - BigUint::from(3u8);
    for _ in 0..rounds {
        let a = &two + random_below(&base_span)?;
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        let mut witness = true;
        for _ in 0..s.saturating_sub(1) {
            x = (&x * &x) % n;
            if x == n_minus_one {
                witness = false;
                break;
            }
            if x == one {
                return Ok(false);
            }
        }
        if witness {
            return Ok(false);
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_len() {
        assert_eq!(byte_len(&BigUint::zero()), 1);
        assert_eq!(byte_len(&BigUint::from(1u8)), 1);
        assert_eq!(byte_len(&BigUint::from(255u8)), 1);
        assert_eq!(byte_len(&BigUint::from(256u32)), 2);
        assert_eq!(byte_len(&(BigUint::one() << 128u32)), 17);
    }

    #[test]
    fn test_known_primes() {
        for p in [2u32, 3, 5, 97, 65_537, 2_147_483_647] {
            assert!(
                is_probable_prime(&BigUint::from(p)).unwrap(),
                "{p} should be prime"
            );
        }
    }

    #[test]
    fn test_known_composites() {
        // Includes the Carmichael numbers 561 and 41041.
        for c in [1u32, 4, 100, 561, 41_041, 65_536] {
            assert!(
                !is_probable_prime(&BigUint::from(c)).unwrap(),
                "{c} should be composite"
            );
        }
    }

    #[test]
    fn test_random_prime_bit_length() {
        for bits in [64usize, 65, 128] {
            let p = random_prime(bits).unwrap();
            assert_eq!(p.bits() as usize, bits);
            assert!(is_probable_prime(&p).unwrap());
        }
    }

    #[test]
    fn test_random_prime_rejects_tiny() {
        assert!(random_prime(1).is_err());
    }

    #[test]
    fn test_random_below_in_range() {
        let bound = BigUint::from(1000u32);
        for _ in 0..100 {
            assert!(random_below(&bound).unwrap() < bound);
        }
    }

    #[test]
    fn test_random_below_tight_bound() {
        let one = BigUint::one();
        assert!(random_below(&one).unwrap().is_zero());
        assert!(random_below(&BigUint::zero()).is_err());
    }
}
