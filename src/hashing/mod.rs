// src/hashing/mod.rs
//! Deterministic canonicalization and content hashing.
//!
//! This is the trust anchor of the whole system: issuance and verification
//! must agree byte-for-byte on the hash of logically identical credential
//! data, across processes and platforms.

pub mod canonical_json;
pub mod digest;
pub mod error;

pub use canonical_json::{canonicalize, to_canonical_json};
pub use digest::{DigestEngine, HashBackend, Sha256Backend};
pub use error::DigestError;
