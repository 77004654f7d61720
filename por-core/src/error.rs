//! Error types for the por-core crate.

use thiserror::Error;

/// Result type alias using PorError
pub type Result<T> = std::result::Result<T, PorError>;

/// Errors that can occur in proof-of-retrievability operations
#[derive(Error, Debug)]
pub enum PorError {
    /// Malformed input bytes: length mismatch, truncation, trailing garbage
    #[error("malformed wire data: {reason}")]
    WireFormat { reason: String },

    /// HMAC rejection or envelope inconsistency on a sealed state
    #[error("state authentication failed")]
    StateAuthFailed,

    /// Attempt to serialize a state that has not been encrypted and signed
    #[error("state must be sealed before serialization")]
    StateNotSealed,

    /// Stored key length does not match the scheme's fixed key size
    #[error("stored key length {len} is incompatible (expected {expected})")]
    KeyIncompatible { len: usize, expected: usize },

    /// Tag authenticator count inconsistent with the file's chunk count
    #[error("tag has {actual} authenticators, expected {expected}")]
    TagShapeMismatch { expected: u32, actual: usize },

    /// Proof sector-response count inconsistent with the verifier's sector count
    #[error("proof has {actual} sector responses, expected {expected}")]
    ProofShapeMismatch { expected: u32, actual: usize },

    /// Operation requires the private form of the verifier
    #[error("operation requires the private form of the verifier")]
    CapabilityMissing,

    /// The system randomness source refused to produce bytes
    #[error("system randomness source failed")]
    RandomnessFailure,

    /// Caller-supplied parameter outside the scheme's domain
    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    /// Reading or seeking the underlying file source failed
    #[error("file access failed: {0}")]
    Io(#[from] std::io::Error),
}

impl PorError {
    pub(crate) fn wire(reason: impl Into<String>) -> Self {
        PorError::WireFormat {
            reason: reason.into(),
        }
    }

    pub(crate) fn param(reason: impl Into<String>) -> Self {
        PorError::InvalidParameter {
            reason: reason.into(),
        }
    }
}
