// src/hashing/error.rs
//! Error kinds for canonicalization and digesting.
//!
//! None of these occur with well-formed credential data. They indicate a
//! programming error or an environment failure upstream and are surfaced
//! immediately: a silently wrong digest would break the trust guarantee
//! without any visible symptom.

use thiserror::Error;

/// Failure while canonicalizing, encoding, or hashing a JSON value.
#[derive(Debug, Error)]
pub enum DigestError {
    /// Input cannot be canonicalized (e.g. nesting past the supported depth).
    /// Fatal, never retried.
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    /// Canonical JSON text encoding failed.
    #[error("canonical serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The underlying hash primitive reported a failure.
    #[error("hash primitive failed: {0}")]
    Hashing(String),
}
