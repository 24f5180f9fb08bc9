// src/storage/registry_store.rs
//! Credential registry keyed by content digest.
//!
//! Provides an in-memory registry of issued credentials. Entries are keyed
//! by their digest for O(1) exact-match verification lookups, and can be
//! scanned with conjunctive predicate rules for recruiter search.
//!
//! # Note
//! For production use, back this with a database; the interface is the
//! stable part (insert / lookup-by-digest / revoke / filtered scan).

use crate::hashing::digest::is_well_formed_digest;
use crate::models::credential::{CredentialError, RegistryEntry};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Rejected registry write.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The entry's record is incomplete.
    #[error(transparent)]
    IncompleteRecord(#[from] CredentialError),

    /// The entry's digest key is not 64 lowercase hex characters.
    #[error("malformed credential hash: {0:?}")]
    MalformedDigest(String),

    /// A required metadata field is empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// An entry with the same digest already exists.
    #[error("credential {0} is already registered")]
    DuplicateEntry(String),
}

/// One independent search predicate.
///
/// A query is a list of these, applied conjunctively: an entry matches only
/// if every rule accepts it. Substring rules are case-insensitive.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateRule {
    /// University name contains the needle
    UniversityContains(String),

    /// Degree type contains the needle
    DegreeContains(String),

    /// Major contains the needle
    MajorContains(String),

    /// GPA, parsed as a number, is at least the threshold.
    /// Entries whose GPA text does not parse never match.
    GpaAtLeast(f64),
}

impl CandidateRule {
    fn matches(&self, entry: &RegistryEntry) -> bool {
        fn contains(haystack: &str, needle: &str) -> bool {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }

        match self {
            CandidateRule::UniversityContains(needle) => {
                contains(&entry.record.university_name, needle)
            }
            CandidateRule::DegreeContains(needle) => contains(&entry.record.degree_type, needle),
            CandidateRule::MajorContains(needle) => contains(&entry.record.major, needle),
            CandidateRule::GpaAtLeast(threshold) => entry
                .record
                .gpa
                .trim()
                .parse::<f64>()
                .map(|gpa| gpa >= *threshold)
                .unwrap_or(false),
        }
    }
}

/// In-memory credential registry.
///
/// Thread-safe behind a single mutex; every operation takes the lock
/// briefly and clones out results, so callers never hold it across I/O.
pub struct RegistryStore {
    /// Issued entries, keyed by credential hash
    entries: Mutex<HashMap<String, RegistryEntry>>,
}

impl RegistryStore {
    /// Creates an empty registry.
    pub fn new() -> Self {
        RegistryStore {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Appends a fully-populated entry.
    ///
    /// # Errors
    /// - [`RegistryError::IncompleteRecord`] if any record field is empty
    /// - [`RegistryError::MalformedDigest`] if the key is not a digest
    /// - [`RegistryError::MissingField`] if issuer metadata is empty
    /// - [`RegistryError::DuplicateEntry`] if the digest is already present
    pub fn insert(&self, entry: RegistryEntry) -> Result<(), RegistryError> {
        entry.record.validate()?;
        if !is_well_formed_digest(&entry.credential_hash) {
            return Err(RegistryError::MalformedDigest(entry.credential_hash));
        }
        if entry.wallet_address.trim().is_empty() {
            return Err(RegistryError::MissingField("wallet_address"));
        }
        if entry.transaction_id.trim().is_empty() {
            return Err(RegistryError::MissingField("transaction_id"));
        }

        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(&entry.credential_hash) {
            return Err(RegistryError::DuplicateEntry(entry.credential_hash));
        }
        entries.insert(entry.credential_hash.clone(), entry);
        Ok(())
    }

    /// Exact-match lookup by digest. Returns at most one entry.
    pub fn lookup(&self, credential_hash: &str) -> Option<RegistryEntry> {
        let entries = self.entries.lock().unwrap();
        entries.get(credential_hash).cloned()
    }

    /// Sets the revocation flag on an entry.
    ///
    /// The only mutation the registry permits. Returns `false` if no entry
    /// has the given digest. Revoking twice is harmless.
    pub fn revoke(&self, credential_hash: &str) -> bool {
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(credential_hash) {
            Some(entry) => {
                entry.is_revoked = true;
                true
            }
            None => false,
        }
    }

    /// Scans entries matching every rule.
    ///
    /// Revoked entries are excluded unless `include_revoked` is set.
    /// Results are ordered by issue time (then digest, for ties) so output
    /// is stable across calls.
    pub fn scan(&self, rules: &[CandidateRule], include_revoked: bool) -> Vec<RegistryEntry> {
        let entries = self.entries.lock().unwrap();
        let mut matched: Vec<RegistryEntry> = entries
            .values()
            .filter(|entry| include_revoked || !entry.is_revoked)
            .filter(|entry| rules.iter().all(|rule| rule.matches(entry)))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            a.issued_at
                .cmp(&b.issued_at)
                .then_with(|| a.credential_hash.cmp(&b.credential_hash))
        });
        matched
    }

    /// Number of registered entries, revoked ones included.
    pub fn count(&self) -> usize {
        let entries = self.entries.lock().unwrap();
        entries.len()
    }
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::credential::CredentialRecord;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn record(name: &str, university: &str, major: &str, gpa: &str) -> CredentialRecord {
        CredentialRecord {
            student_name: name.into(),
            university_name: university.into(),
            degree_type: "Bachelor of Science".into(),
            major: major.into(),
            gpa: gpa.into(),
            graduation_date: "2023".into(),
        }
    }

    fn entry(digest_byte: &str, record: CredentialRecord) -> RegistryEntry {
        RegistryEntry {
            record,
            credential_hash: digest_byte.repeat(64),
            wallet_address: "0xissuer".into(),
            transaction_id: "0xtx".into(),
            raw_json: json!({}),
            is_revoked: false,
            issued_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_insert_and_lookup() {
        let store = RegistryStore::new();
        let e = entry("a", record("Alex Chen", "Stanford University", "Computer Science", "3.9"));
        store.insert(e.clone()).unwrap();

        let found = store.lookup(&e.credential_hash).unwrap();
        assert_eq!(found.record.student_name, "Alex Chen");
        assert!(!found.is_revoked);
        assert!(store.lookup(&"b".repeat(64)).is_none());
    }

    #[test]
    fn test_insert_rejects_incomplete_record() {
        let store = RegistryStore::new();
        let e = entry("a", record("", "Stanford University", "Computer Science", "3.9"));
        assert!(matches!(
            store.insert(e),
            Err(RegistryError::IncompleteRecord(_))
        ));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_insert_rejects_malformed_digest() {
        let store = RegistryStore::new();
        let mut e = entry("a", record("Alex", "Stanford", "CS", "3.9"));
        e.credential_hash = "not-a-digest".into();
        assert!(matches!(
            store.insert(e),
            Err(RegistryError::MalformedDigest(_))
        ));
    }

    #[test]
    fn test_insert_rejects_missing_issuer_metadata() {
        let store = RegistryStore::new();
        let mut e = entry("a", record("Alex", "Stanford", "CS", "3.9"));
        e.transaction_id = "".into();
        assert!(matches!(
            store.insert(e),
            Err(RegistryError::MissingField("transaction_id"))
        ));
    }

    #[test]
    fn test_insert_rejects_duplicate_digest() {
        let store = RegistryStore::new();
        let e = entry("a", record("Alex", "Stanford", "CS", "3.9"));
        store.insert(e.clone()).unwrap();
        assert!(matches!(
            store.insert(e),
            Err(RegistryError::DuplicateEntry(_))
        ));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_revoke_sets_flag_and_keeps_entry() {
        let store = RegistryStore::new();
        let e = entry("a", record("Alex", "Stanford", "CS", "3.9"));
        let digest = e.credential_hash.clone();
        store.insert(e).unwrap();

        assert!(store.revoke(&digest));
        let found = store.lookup(&digest).unwrap();
        assert!(found.is_revoked);
        // Revoked entries are never deleted.
        assert_eq!(store.count(), 1);
        // Unknown digest reports false.
        assert!(!store.revoke(&"b".repeat(64)));
    }

    #[test]
    fn test_scan_applies_rules_conjunctively() {
        let store = RegistryStore::new();
        store
            .insert(entry("a", record("Alex", "Stanford University", "Computer Science", "3.9")))
            .unwrap();
        store
            .insert(entry("b", record("Blair", "UC Berkeley", "Computer Science", "3.4")))
            .unwrap();
        store
            .insert(entry("c", record("Casey", "Stanford University", "History", "3.8")))
            .unwrap();

        let rules = vec![
            CandidateRule::UniversityContains("stanford".into()),
            CandidateRule::MajorContains("computer".into()),
        ];
        let hits = store.scan(&rules, false);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.student_name, "Alex");
    }

    #[test]
    fn test_scan_gpa_threshold() {
        let store = RegistryStore::new();
        store
            .insert(entry("a", record("Alex", "Stanford", "CS", "3.9")))
            .unwrap();
        store
            .insert(entry("b", record("Blair", "Berkeley", "CS", "3.4")))
            .unwrap();
        store
            .insert(entry("c", record("Casey", "MIT", "CS", "N/A")))
            .unwrap();

        let hits = store.scan(&[CandidateRule::GpaAtLeast(3.5)], false);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.student_name, "Alex");
    }

    #[test]
    fn test_scan_excludes_revoked_unless_requested() {
        let store = RegistryStore::new();
        let e = entry("a", record("Alex", "Stanford", "CS", "3.9"));
        let digest = e.credential_hash.clone();
        store.insert(e).unwrap();
        store.revoke(&digest);

        assert!(store.scan(&[], false).is_empty());
        assert_eq!(store.scan(&[], true).len(), 1);
    }

    #[test]
    fn test_scan_order_is_stable() {
        let store = RegistryStore::new();
        let mut first = entry("a", record("Alex", "Stanford", "CS", "3.9"));
        first.issued_at = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let second = entry("b", record("Blair", "Berkeley", "CS", "3.4"));
        store.insert(first).unwrap();
        store.insert(second).unwrap();

        let hits = store.scan(&[], false);
        assert_eq!(hits[0].record.student_name, "Blair");
        assert_eq!(hits[1].record.student_name, "Alex");
    }
}
