// src/hashing/digest.rs
//! Content digest computation over the canonical JSON encoding.
//!
//! The hash primitive is injected through [`HashBackend`] so the engine can
//! be exercised in tests with a deterministic fake while production uses
//! SHA-256, the same function the browser implementation hashed with.

use crate::hashing::canonical_json::{canonicalize, to_canonical_json};
use crate::hashing::error::DigestError;
use ethers::utils::hex;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// A 256-bit one-way hash over a byte string.
///
/// Implementations must be stateless and safe to call concurrently.
pub trait HashBackend: Send + Sync {
    /// Short algorithm label, for logs and diagnostics.
    fn algorithm(&self) -> &'static str;

    /// Hashes `bytes` to a 32-byte output.
    fn hash(&self, bytes: &[u8]) -> Result<[u8; 32], DigestError>;
}

/// SHA-256 via the `sha2` crate. The production backend.
pub struct Sha256Backend;

impl HashBackend for Sha256Backend {
    fn algorithm(&self) -> &'static str {
        "sha-256"
    }

    fn hash(&self, bytes: &[u8]) -> Result<[u8; 32], DigestError> {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Ok(hasher.finalize().into())
    }
}

/// Computes credential digests: canonicalize, encode, hash, hex-render.
///
/// Cheap to clone; the backend is shared behind an `Arc`.
#[derive(Clone)]
pub struct DigestEngine {
    backend: Arc<dyn HashBackend>,
}

impl DigestEngine {
    /// Engine backed by SHA-256.
    pub fn sha256() -> Self {
        Self::with_backend(Arc::new(Sha256Backend))
    }

    /// Engine with an injected hash backend.
    pub fn with_backend(backend: Arc<dyn HashBackend>) -> Self {
        DigestEngine { backend }
    }

    /// Digests a JSON value.
    ///
    /// # Process Flow
    /// 1. Canonicalize (recursive key sort, arrays preserved)
    /// 2. Encode to compact canonical JSON, take UTF-8 bytes
    /// 3. Hash with the configured backend
    /// 4. Render lowercase zero-padded hex (64 characters)
    ///
    /// # Errors
    /// Propagates canonicalization/encoding failures; backend failures
    /// surface as [`DigestError::Hashing`].
    pub fn digest_value(&self, value: &Value) -> Result<String, DigestError> {
        let canonical = canonicalize(value)?;
        let encoded = to_canonical_json(&canonical)?;
        let bytes = self.backend.hash(encoded.as_bytes())?;
        Ok(hex::encode(bytes))
    }

    /// Label of the configured backend.
    pub fn algorithm(&self) -> &'static str {
        self.backend.algorithm()
    }
}

/// Whether `s` has the shape of a rendered digest: exactly 64 lowercase hex
/// characters, no separators.
pub fn is_well_formed_digest(s: &str) -> bool {
    s.len() == 64
        && s.bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
