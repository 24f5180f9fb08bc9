// src/services/verifier.rs
//! Credential verification service.
//!
//! Classifies a caller-supplied credential JSON against the registry: the
//! JSON is canonicalized and digested exactly as at issuance, and the
//! digest is used as an exact-match lookup key. Each request is independent
//! and terminates in one of three states (VALID / REVOKED / NOT_FOUND)
//! computed from the current registry snapshot; NOT_FOUND is a definitive
//! answer, not a transient error.

use crate::hashing::digest::DigestEngine;
use crate::hashing::error::DigestError;
use crate::models::credential::{VerificationReport, VerificationStatus};
use crate::storage::registry_store::RegistryStore;
use serde_json::Value;
use std::error::Error;
use std::sync::Arc;

/// Verifier over a shared registry.
#[derive(Clone)]
pub struct Verifier {
    registry: Arc<RegistryStore>,
    digest_engine: DigestEngine,
}

impl Verifier {
    /// Constructs a new Verifier.
    pub fn new(registry: Arc<RegistryStore>, digest_engine: DigestEngine) -> Self {
        Verifier {
            registry,
            digest_engine,
        }
    }

    /// Verifies raw credential JSON text.
    ///
    /// # Errors
    /// Fails on malformed JSON or on a digest failure. A well-formed
    /// credential that simply isn't registered is NOT an error; it reports
    /// `NOT_FOUND`.
    pub fn verify_json(&self, raw: &str) -> Result<VerificationReport, Box<dyn Error>> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(self.verify_value(&value)?)
    }

    /// Verifies an already-parsed credential value.
    ///
    /// The input's key order is irrelevant; any structurally equal value
    /// resolves to the same registry entry.
    pub fn verify_value(&self, value: &Value) -> Result<VerificationReport, DigestError> {
        let digest = self.digest_engine.digest_value(value)?;

        let report = match self.registry.lookup(&digest) {
            None => VerificationReport {
                status: VerificationStatus::NotFound,
                credential: None,
            },
            Some(entry) if entry.is_revoked => VerificationReport {
                status: VerificationStatus::Revoked,
                credential: Some(entry),
            },
            Some(entry) => VerificationReport {
                status: VerificationStatus::Valid,
                credential: Some(entry),
            },
        };

        log::debug!("verification of {} -> {:?}", digest, report.status);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::credential::CredentialRecord;
    use crate::services::credential_issuer::CredentialIssuer;
    use crate::wallet::key_management::KeyManager;
    use serde_json::json;

    fn setup() -> (CredentialIssuer, Verifier) {
        let registry = Arc::new(RegistryStore::new());
        let engine = DigestEngine::sha256();
        let issuer = CredentialIssuer::new(
            registry.clone(),
            Arc::new(KeyManager::new()),
            engine.clone(),
        );
        let verifier = Verifier::new(registry, engine);
        (issuer, verifier)
    }

    fn sample_record() -> CredentialRecord {
        CredentialRecord {
            student_name: "Alex Chen".into(),
            university_name: "Stanford University".into(),
            degree_type: "Bachelor of Science".into(),
            major: "Computer Science".into(),
            gpa: "3.9".into(),
            graduation_date: "2023".into(),
        }
    }

    #[test]
    fn test_issue_then_verify_identical_json_is_valid() {
        let (issuer, verifier) = setup();
        issuer.issue(sample_record()).unwrap();

        // Keys in a different order than the struct declares.
        let report = verifier
            .verify_json(
                r#"{
                    "gpa": "3.9",
                    "graduation_date": "2023",
                    "student_name": "Alex Chen",
                    "major": "Computer Science",
                    "degree_type": "Bachelor of Science",
                    "university_name": "Stanford University"
                }"#,
            )
            .unwrap();
        assert_eq!(report.status, VerificationStatus::Valid);
        assert_eq!(
            report.credential.unwrap().record.student_name,
            "Alex Chen"
        );
    }

    #[test]
    fn test_altered_value_is_not_found() {
        let (issuer, verifier) = setup();
        issuer.issue(sample_record()).unwrap();

        let mut altered = sample_record().to_value().unwrap();
        altered["gpa"] = json!("3.90");
        let report = verifier.verify_value(&altered).unwrap();
        assert_eq!(report.status, VerificationStatus::NotFound);
        assert!(report.credential.is_none());

        // Even whitespace inside a field value changes the digest.
        let mut padded = sample_record().to_value().unwrap();
        padded["student_name"] = json!("Alex Chen ");
        assert_eq!(
            verifier.verify_value(&padded).unwrap().status,
            VerificationStatus::NotFound
        );
    }

    #[test]
    fn test_revoked_entry_reports_revoked_never_valid() {
        let (issuer, verifier) = setup();
        let entry = issuer.issue(sample_record()).unwrap();
        issuer.revoke(&entry.credential_hash);

        let report = verifier
            .verify_value(&sample_record().to_value().unwrap())
            .unwrap();
        assert_eq!(report.status, VerificationStatus::Revoked);
        assert!(!report.status.is_valid());
        // The matched entry is still reported so callers can display it.
        assert!(report.credential.unwrap().is_revoked);
    }

    #[test]
    fn test_unknown_credential_is_not_found() {
        let (_issuer, verifier) = setup();
        let report = verifier
            .verify_value(&sample_record().to_value().unwrap())
            .unwrap();
        assert_eq!(report.status, VerificationStatus::NotFound);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let (_issuer, verifier) = setup();
        assert!(verifier.verify_json("{not json").is_err());
    }
}
