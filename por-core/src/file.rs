//! Chunked sector view over a seekable byte source.
//!
//! The scheme reads a file as `chunk_count` chunks of `sectors` sectors of
//! `sector_size` bytes each. A sector is interpreted as a big-endian
//! unsigned integer; reads past end-of-file are zero-filled so the last
//! chunk is always complete.

use std::io::{Read, Seek, SeekFrom};

use num_bigint::BigUint;

use crate::error::{PorError, Result};

/// Read-only chunk/sector view borrowed over a `Read + Seek` source for the
/// duration of one protocol operation.
pub struct ChunkedFile<'a, F: Read + Seek> {
    source: &'a mut F,
    size: u64,
    sectors: u32,
    sector_size: u32,
}

impl<'a, F: Read + Seek> ChunkedFile<'a, F> {
    pub fn new(source: &'a mut F, sectors: u32, sector_size: u32) -> Result<Self> {
        if sectors == 0 {
            return Err(PorError::param("sector count must be nonzero"));
        }
        if sector_size == 0 {
            return Err(PorError::param("sector size must be nonzero"));
        }
        let size = source.seek(SeekFrom::End(0))?;
        Ok(Self {
            source,
            size,
            sectors,
            sector_size,
        })
    }

    /// Total size of the underlying source in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of chunks, counting a trailing partial chunk as one.
    pub fn chunk_count(&self) -> u64 {
        let chunk_bytes = u64::from(self.sectors) * u64::from(self.sector_size);
        self.size.div_ceil(chunk_bytes)
    }

    /// Read sector `sector` of chunk `chunk` as a big-endian integer.
    ///
    /// Bytes beyond end-of-file read as zero.
    pub fn get_sector(&mut self, chunk: u32, sector: u32) -> Result<BigUint> {
        let offset = (u64::from(chunk) * u64::from(self.sectors) + u64::from(sector))
            * u64::from(self.sector_size);
        let mut buf = vec![0u8; self.sector_size as usize];
        if offset < self.size {
            self.source.seek(SeekFrom::Start(offset))?;
            let mut filled = 0;
            while filled < buf.len() {
                let n = self.source.read(&mut buf[filled..])?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
        }
        Ok(BigUint::from_bytes_be(&buf))
    }
}
