// src/wallet/key_management.rs
//! Issuer wallet: key management and message signing.
//!
//! Stands in for the browser wallet the issuance flow would normally talk
//! to. Provides:
//! - secp256k1 key generation (via `k256`)
//! - Ethereum-style address derivation (Keccak-256 of the public key)
//! - ECDSA message signing with Keccak-256 prehashing
//! - the signature-derived pseudo transaction reference recorded alongside
//!   each issued credential
//!
//! No real transaction is submitted anywhere; signing the digest is the
//! stand-in for anchoring it on chain.

use ethers::types::Address;
use ethers::utils::{hex, keccak256};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature, SigningKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};

/// Issuer key pair with signing capabilities.
///
/// # Security Notes
/// - The secret key is never exposed publicly
/// - Uses cryptographically secure random number generation
/// - ECDSA signatures are deterministic (RFC 6979), so signing the same
///   digest twice yields the same bytes
#[derive(Clone)]
pub struct KeyManager {
    /// Securely stored private key (never exposed)
    secret_key: SecretKey,
    /// Derived public key for verification
    pub public_key: PublicKey,
}

impl KeyManager {
    /// Generates a KeyManager with a fresh random key pair.
    ///
    /// # Panics
    /// May panic if the system RNG fails (extremely unlikely).
    pub fn new() -> Self {
        let secret_key = SecretKey::random(&mut rand::thread_rng());
        let public_key = secret_key.public_key();
        KeyManager {
            secret_key,
            public_key,
        }
    }

    /// Ethereum-style address of this wallet: the last 20 bytes of the
    /// Keccak-256 hash of the uncompressed public key, 0x-prefixed hex.
    pub fn address(&self) -> String {
        // Uncompressed SEC1: 0x04 prefix + 64 bytes of raw key material.
        let point = self.public_key.to_encoded_point(false);
        let raw_public_key = &point.as_bytes()[1..];

        let hash = keccak256(raw_public_key);
        let address = Address::from_slice(&hash[12..]);
        format!("0x{:x}", address)
    }

    /// Signs a message using ECDSA (secp256k1) with Keccak-256 prehashing.
    ///
    /// # Arguments
    /// * `message` - Raw message bytes to sign
    ///
    /// # Returns
    /// 64-byte compact ECDSA signature (R || S values)
    ///
    /// # Panics
    /// May panic if signing fails, which cannot happen for a 32-byte
    /// prehash with a valid key.
    pub fn sign_message(&self, message: &[u8]) -> Vec<u8> {
        let hash = keccak256(message);

        let signing_key = SigningKey::from(&self.secret_key);
        let signature: Signature = signing_key
            .sign_prehash(&hash)
            .expect("Failed to sign message hash");

        signature.to_vec()
    }

    /// Anchors a credential digest by signing it, returning the opaque
    /// transaction reference stored in the registry: `0x` followed by the
    /// first 64 hex characters of the signature.
    ///
    /// The signature carries no independent value; without a persisted
    /// registry entry the credential is treated as not issued.
    pub fn anchor_digest(&self, digest_hex: &str) -> String {
        let signature = self.sign_message(digest_hex.as_bytes());
        let signature_hex = hex::encode(signature);
        format!("0x{}", &signature_hex[..64])
    }
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new()
    }
}
