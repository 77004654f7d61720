//! Per-file verifier state and its encrypt-and-sign envelope.
//!
//! The server stores the state between rounds, so its PRF keys must stay
//! confidential and tamper-evident while the chunk count stays readable.
//! The envelope encrypts the keys with AES-256-CFB and authenticates the
//! chunk count, the IV, and the ciphertext with HMAC-SHA256:
//!
//! ```text
//! u32(sig_len) || sig_region || u32(mac_len) || mac
//!
//! sig_region = u32(n) || u32(iv_len) || iv || u32(enc_len) || enc_blob
//! enc_blob   = AES-256-CFB( bytes(f_key) || bytes(alpha_key) )
//! ```
//!
//! Only a sealed state may be serialized; the sealed bytes handed to the
//! server are never modified, and opening works on a decrypted copy.

use aes::cipher::{AsyncStreamCipher, KeyIvInit};
use aes::Aes256;
use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::codec::{ByteReader, ByteWriter, Serializable};
use crate::error::{PorError, Result};
use crate::field;
use crate::prf::{KeyedPrf, PrfKey, TAG_ALPHA, TAG_F};
use crate::{IV_SIZE, KEY_SIZE, MAC_SIZE};

type Aes256CfbEnc = cfb_mode::Encryptor<Aes256>;
type Aes256CfbDec = cfb_mode::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Per-file state: chunk count plus the two PRF keys that generated the tag.
///
/// A state is either *open* (keys usable, not serializable) or *sealed*
/// (envelope bytes present, keys unreadable without the seal keys).
#[derive(Clone, Debug)]
pub struct State {
    n: u32,
    f_key: PrfKey,
    alpha_key: PrfKey,
    raw: Vec<u8>,
    sealed: bool,
}

impl State {
    pub(crate) fn new(n: u32, f_key: PrfKey, alpha_key: PrfKey) -> Self {
        Self {
            n,
            f_key,
            alpha_key,
            raw: Vec::new(),
            sealed: false,
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Chunk count of the tagged file.
    ///
    /// Works on sealed states too: `n` sits in the clear inside the signed
    /// region, so no keys are needed. Reading it from a mangled envelope is
    /// an authentication failure.
    pub fn chunk_count(&self) -> Result<u32> {
        if !self.sealed {
            return Ok(self.n);
        }
        let mut outer = ByteReader::new(&self.raw);
        let sig_region = outer
            .read_bytes()
            .map_err(|_| PorError::StateAuthFailed)?;
        ByteReader::new(sig_region)
            .read_u32()
            .map_err(|_| PorError::StateAuthFailed)
    }

    /// Encrypt the PRF keys and sign the envelope, sealing the state.
    ///
    /// Sealing an already-sealed state is a no-op.
    pub(crate) fn encrypt_and_sign(
        &mut self,
        k_enc: &[u8; KEY_SIZE],
        k_mac: &[u8; KEY_SIZE],
    ) -> Result<()> {
        if self.sealed {
            return Ok(());
        }

        let mut plain = ByteWriter::new();
        plain.put_bytes(self.f_key.as_bytes());
        plain.put_bytes(self.alpha_key.as_bytes());
        let mut enc_blob = plain.into_bytes();

        let iv = field::random_bytes::<IV_SIZE>()?;
        Aes256CfbEnc::new(k_enc.into(), (&iv).into()).encrypt(&mut enc_blob);

        let mut sig = ByteWriter::new();
        sig.put_u32(self.n);
        sig.put_bytes(&iv);
        sig.put_bytes(&enc_blob);
        let sig_region = sig.into_bytes();

        let mut mac = HmacSha256::new_from_slice(k_mac)
            .expect("HMAC-SHA256 accepts keys of any length");
        mac.update(&sig_region);
        let digest = mac.finalize().into_bytes();

        let mut raw = ByteWriter::new();
        raw.put_bytes(&sig_region);
        raw.put_bytes(&digest);
        self.raw = raw.into_bytes();
        self.sealed = true;
        Ok(())
    }

    /// Verify the envelope and decrypt the PRF keys into an open copy.
    ///
    /// Any parse inconsistency, MAC mismatch, or unexpected key length is
    /// `StateAuthFailed`. The sealed original is left untouched.
    pub(crate) fn check_and_decrypt(
        &self,
        k_enc: &[u8; KEY_SIZE],
        k_mac: &[u8; KEY_SIZE],
    ) -> Result<State> {
        if !self.sealed {
            return Ok(self.clone());
        }

        let mut outer = ByteReader::new(&self.raw);
        let sig_region = outer
            .read_bytes()
            .map_err(|_| PorError::StateAuthFailed)?;
        let mac = outer.read_bytes().map_err(|_| PorError::StateAuthFailed)?;
        outer.finish().map_err(|_| PorError::StateAuthFailed)?;
        if mac.len() != MAC_SIZE {
            return Err(PorError::StateAuthFailed);
        }

        let mut expected = HmacSha256::new_from_slice(k_mac)
            .expect("HMAC-SHA256 accepts keys of any length");
        expected.update(sig_region);
        let expected = expected.finalize().into_bytes();
        if !bool::from(expected.as_slice().ct_eq(mac)) {
            return Err(PorError::StateAuthFailed);
        }

        let mut sig = ByteReader::new(sig_region);
        let n = sig.read_u32().map_err(|_| PorError::StateAuthFailed)?;
        let iv = sig.read_bytes().map_err(|_| PorError::StateAuthFailed)?;
        if iv.len() != IV_SIZE {
            return Err(PorError::StateAuthFailed);
        }
        let enc_blob = sig.read_bytes().map_err(|_| PorError::StateAuthFailed)?;
        sig.finish().map_err(|_| PorError::StateAuthFailed)?;

        let iv: [u8; IV_SIZE] = iv.try_into().expect("length checked");
        let mut plain = enc_blob.to_vec();
        Aes256CfbDec::new(k_enc.into(), (&iv).into()).decrypt(&mut plain);

        let mut keys = ByteReader::new(&plain);
        let f_key = read_key(&mut keys)?;
        let alpha_key = read_key(&mut keys)?;
        keys.finish().map_err(|_| PorError::StateAuthFailed)?;

        Ok(State::new(n, f_key, alpha_key))
    }

    /// The per-chunk pad PRF `f`, bounded by the field prime.
    pub(crate) fn prf_f(&self, p: &BigUint) -> Result<KeyedPrf> {
        debug_assert!(!self.sealed, "PRFs require an open state");
        KeyedPrf::new(self.f_key.clone(), p.clone(), TAG_F)
    }

    /// The per-sector coefficient PRF `alpha`, bounded by the field prime.
    pub(crate) fn prf_alpha(&self, p: &BigUint) -> Result<KeyedPrf> {
        debug_assert!(!self.sealed, "PRFs require an open state");
        KeyedPrf::new(self.alpha_key.clone(), p.clone(), TAG_ALPHA)
    }
}

fn read_key(r: &mut ByteReader<'_>) -> Result<PrfKey> {
    let bytes = r.read_bytes().map_err(|_| PorError::StateAuthFailed)?;
    let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| PorError::StateAuthFailed)?;
    Ok(PrfKey::from_bytes(bytes))
}

/// A sealed state's identity is its envelope; an open state's identity is
/// its contents.
impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        if self.sealed != other.sealed {
            return false;
        }
        if self.sealed {
            self.raw == other.raw
        } else {
            self.n == other.n && self.f_key == other.f_key && self.alpha_key == other.alpha_key
        }
    }
}

impl Eq for State {}

impl Serializable for State {
    fn write(&self, w: &mut ByteWriter) -> Result<()> {
        if !self.sealed {
            return Err(PorError::StateNotSealed);
        }
        w.put_bytes(&self.raw);
        Ok(())
    }

    fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        let raw = r.read_bytes()?.to_vec();
        Ok(Self {
            n: 0,
            f_key: PrfKey::zeroed(),
            alpha_key: PrfKey::zeroed(),
            raw,
            sealed: true,
        })
    }
}
