//! Length-prefixed big-endian wire codec.
//!
//! Every serializable protocol value is framed from three primitives:
//!
//! - `u32(n)`: four bytes big-endian
//! - `bytes(b)`: `u32(len(b)) || b`
//! - `bigint(x)`: `u32(min_byte_len(x)) || big_endian(x)`
//!
//! Top-level decoding rejects trailing bytes, so two implementations of the
//! format agree on every byte. A base64 rendering (standard alphabet, `=`
//! padding) is available per call site.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use num_bigint::BigUint;

use crate::error::{PorError, Result};

/// Growable byte sink for the wire format.
#[derive(Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn put_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// `u32(len) || bytes`.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.put_u32(bytes.len() as u32);
        self.put_raw(bytes);
    }

    /// `u32(min_byte_len) || big_endian`. Zero encodes as a single zero byte.
    pub fn put_bigint(&mut self, value: &BigUint) {
        let be = value.to_bytes_be();
        self.put_u32(be.len() as u32);
        self.put_raw(&be);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Checked cursor over wire bytes.
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    pub fn read_raw(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .ok_or_else(|| PorError::wire("length overflow"))?;
        if end > self.bytes.len() {
            return Err(PorError::wire(format!(
                "truncated input: need {len} bytes at offset {}",
                self.offset
            )));
        }
        let out = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(out)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let raw = self.read_raw(4)?;
        Ok(u32::from_be_bytes(raw.try_into().expect("length checked")))
    }

    pub fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.read_raw(len)
    }

    pub fn read_bigint(&mut self) -> Result<BigUint> {
        Ok(BigUint::from_bytes_be(self.read_bytes()?))
    }

    /// Assert the whole input was consumed.
    pub fn finish(&self) -> Result<()> {
        if self.remaining() != 0 {
            return Err(PorError::wire(format!(
                "{} trailing bytes after value",
                self.remaining()
            )));
        }
        Ok(())
    }
}

/// Wire-format capability shared by every protocol value.
///
/// `write` is fallible because a `State` refuses serialization until it has
/// been sealed.
pub trait Serializable: Sized {
    fn write(&self, w: &mut ByteWriter) -> Result<()>;
    fn read(r: &mut ByteReader<'_>) -> Result<Self>;

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut w = ByteWriter::new();
        self.write(&mut w)?;
        Ok(w.into_bytes())
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::new(bytes);
        let value = Self::read(&mut r)?;
        r.finish()?;
        Ok(value)
    }

    fn to_base64(&self) -> Result<String> {
        Ok(STANDARD.encode(self.to_bytes()?))
    }

    fn from_base64(text: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(text)
            .map_err(|e| PorError::wire(format!("invalid base64: {e}")))?;
        Self::from_bytes(&bytes)
    }
}
