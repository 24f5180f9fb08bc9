// src/services/credential_issuer.rs
//! Credential Issuer Service
//!
//! Runs the issuance pipeline: validate the record, canonicalize and digest
//! it, obtain the issuer signature over the digest, and append the registry
//! entry. The append is all-or-nothing: if it fails, the credential is not
//! issued, even though a signature was already produced (the signature
//! carries no independent value without a persisted entry).

use crate::hashing::canonical_json::canonicalize;
use crate::hashing::digest::DigestEngine;
use crate::hashing::error::DigestError;
use crate::models::credential::{CredentialError, CredentialRecord, RegistryEntry};
use crate::storage::registry_store::{RegistryError, RegistryStore};
use crate::wallet::key_management::KeyManager;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

/// Why an issuance request was refused.
#[derive(Debug, Error)]
pub enum IssueError {
    /// The submitted record is incomplete.
    #[error(transparent)]
    InvalidRecord(#[from] CredentialError),

    /// Canonicalization or hashing failed.
    #[error(transparent)]
    Digest(#[from] DigestError),

    /// The record could not be converted to a JSON value.
    #[error("record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The registry refused the append.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Service for issuing and revoking credentials.
///
/// Holds shared handles to the registry, the issuer wallet, and the digest
/// engine; cheap to clone and safe to use concurrently.
#[derive(Clone)]
pub struct CredentialIssuer {
    registry: Arc<RegistryStore>,
    key_manager: Arc<KeyManager>,
    digest_engine: DigestEngine,
}

impl CredentialIssuer {
    /// Creates a new CredentialIssuer over shared collaborators.
    pub fn new(
        registry: Arc<RegistryStore>,
        key_manager: Arc<KeyManager>,
        digest_engine: DigestEngine,
    ) -> Self {
        CredentialIssuer {
            registry,
            key_manager,
            digest_engine,
        }
    }

    /// Issues a credential.
    ///
    /// # Process Flow
    /// 1. Validate that every record field is filled
    /// 2. Canonicalize the record and compute its digest
    /// 3. Sign the digest to obtain the transaction reference
    /// 4. Append the registry entry (fails on duplicate digest)
    ///
    /// # Errors
    /// Any failed step aborts the pipeline; nothing is persisted on error.
    pub fn issue(&self, record: CredentialRecord) -> Result<RegistryEntry, IssueError> {
        record.validate()?;

        let value = record.to_value()?;
        let canonical = canonicalize(&value)?;
        let digest = self.digest_engine.digest_value(&value)?;

        let wallet_address = self.key_manager.address();
        let transaction_id = self.key_manager.anchor_digest(&digest);

        let entry = RegistryEntry {
            record,
            credential_hash: digest,
            wallet_address,
            transaction_id,
            raw_json: canonical,
            is_revoked: false,
            issued_at: Utc::now(),
        };

        self.registry.insert(entry.clone())?;
        log::info!(
            "issued credential {} for {}",
            entry.credential_hash,
            entry.record.student_name
        );
        Ok(entry)
    }

    /// Revokes a previously issued credential by digest.
    ///
    /// Returns `false` if no entry has the given digest.
    pub fn revoke(&self, credential_hash: &str) -> bool {
        let revoked = self.registry.revoke(credential_hash);
        if revoked {
            log::info!("revoked credential {}", credential_hash);
        }
        revoked
    }
}
