//! Private Shacham-Waters proof-of-retrievability engine.
//!
//! A client tags a file before uploading it, keeping nothing but a small
//! verifier; the server stores the file, the tag, and an encrypted state
//! blob. Short random challenges then convince the client the server still
//! holds every chunk.
//!
//! # Architecture
//!
//! ```text
//! ENCODE:
//!   File -> n chunks x s sectors -> sigma[i] = f(i) + sum_j alpha(j)*sector(i,j)
//!   PRF keys sealed into the state (AES-256-CFB + HMAC-SHA256)
//!
//! AUDIT ROUND:
//!   gen_challenge: fresh key -> index PRF + coefficient PRF
//!   prove:  mu[j] = sum_t v(t)*sector(i(t),j),  sigma = sum_t v(t)*tag.sigma[i(t)]
//!   verify: sigma == sum_t v(t)*f(i(t)) + sum_j alpha(j)*mu[j]   (mod p)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use por_core::{Por, Serializable};
//! use std::io::Cursor;
//!
//! let verifier = Por::gen_default()?;
//! let mut file = Cursor::new(data);
//!
//! // Store phase: tag the file, ship tag + sealed state to the server.
//! let (tag, state) = verifier.encode(&mut file)?;
//!
//! // Audit round.
//! let challenge = verifier.gen_challenge(&state)?;
//! let proof = verifier.prove(&mut file, &challenge, &tag)?; // server side
//! assert!(verifier.verify(&proof, &challenge, &state)?);
//! ```

pub mod codec;
pub mod error;
pub mod field;
pub mod file;
pub mod prf;
pub mod scheme;
pub mod state;
pub mod types;

// Re-export main types and functions
pub use codec::{ByteReader, ByteWriter, Serializable};
pub use error::{PorError, Result};
pub use file::ChunkedFile;
pub use prf::{KeyedPrf, PrfKey};
pub use scheme::Por;
pub use state::State;
pub use types::{Challenge, Proof, Tag};

/// Key size in bytes for state sealing and PRF keys (AES-256, HMAC-SHA256).
pub const KEY_SIZE: usize = 32;

/// AES-CFB initialization vector size in bytes.
pub const IV_SIZE: usize = 16;

/// HMAC-SHA256 digest size in bytes.
pub const MAC_SIZE: usize = 32;

/// Default prime bit length for `Por::gen_default`.
pub const DEFAULT_PRIME_BITS: usize = 1024;

/// Default number of sectors per chunk.
///
/// More sectors shrink the tag (fewer chunks) at the cost of a larger
/// proof (one response per sector).
pub const DEFAULT_SECTORS: u32 = 10;
