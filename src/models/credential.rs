// src/models/credential.rs
//! Academic credential data model.
//!
//! Defines the record whose content gets hashed, the registry row built
//! around that hash, and the verification outcome types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The attributes that participate in hashing.
///
/// All fields are plain text. GPA is deliberately a `String`: it is stored
/// and hashed exactly as typed, so `"3.9"` and `"3.90"` are different
/// credentials. Normalizing it to a number would silently change digests.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Full name of the student
    pub student_name: String,

    /// Name of the issuing university
    pub university_name: String,

    /// Type of degree (e.g., "Bachelor of Science")
    pub degree_type: String,

    /// Field of study
    pub major: String,

    /// Grade point average, as originally typed
    pub gpa: String,

    /// Year of graduation
    pub graduation_date: String,
}

/// A record failed structural validation.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// A required field is empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

impl CredentialRecord {
    /// Checks that every field is filled in.
    ///
    /// Issuance refuses incomplete data; an empty field would still hash
    /// fine, but the resulting credential would be meaningless.
    pub fn validate(&self) -> Result<(), CredentialError> {
        let fields = [
            ("student_name", &self.student_name),
            ("university_name", &self.university_name),
            ("degree_type", &self.degree_type),
            ("major", &self.major),
            ("gpa", &self.gpa),
            ("graduation_date", &self.graduation_date),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(CredentialError::MissingField(name));
            }
        }
        Ok(())
    }

    /// The record as a JSON value, ready for canonicalization.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// A row in the credential registry.
///
/// Created once at issuance and immutable afterwards except for
/// `is_revoked`, which only an explicit revoke operation may set. Entries
/// are never physically deleted.
///
/// The record fields are flattened so a serialized entry has the same flat
/// shape as the registry's persisted rows.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegistryEntry {
    /// The hashed credential attributes
    #[serde(flatten)]
    pub record: CredentialRecord,

    /// Content digest of the canonical record; the registry key
    pub credential_hash: String,

    /// Address of the issuing wallet
    pub wallet_address: String,

    /// Opaque transaction reference produced at issuance
    pub transaction_id: String,

    /// The canonical form that was hashed, persisted for audit
    pub raw_json: Value,

    /// Revocation flag; false at issuance
    pub is_revoked: bool,

    /// Issuance timestamp
    pub issued_at: DateTime<Utc>,
}

/// Outcome of classifying a verification request against the registry.
///
/// These are ordinary result values, not errors: a missing entry is a
/// definitive answer given the current registry state.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// A matching entry exists and its revocation flag is clear
    Valid,
    /// A matching entry exists but has been revoked
    Revoked,
    /// No entry matches the computed digest
    NotFound,
}

impl VerificationStatus {
    /// Human-readable explanation of the outcome.
    pub fn describe(&self) -> &'static str {
        match self {
            VerificationStatus::Valid => {
                "This credential is valid and verified on the blockchain!"
            }
            VerificationStatus::Revoked => {
                "This credential has been revoked and is no longer valid."
            }
            VerificationStatus::NotFound => {
                "This credential could not be found in the blockchain registry."
            }
        }
    }

    /// Whether the outcome counts as a successful verification.
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationStatus::Valid)
    }
}

/// Full verification result: the status plus the matched entry, if any.
#[derive(Serialize, Debug, Clone)]
pub struct VerificationReport {
    pub status: VerificationStatus,
    pub credential: Option<RegistryEntry>,
}
