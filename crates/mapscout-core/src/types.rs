//! Shared types used across the Mapscout application.
//!
//! This module defines common newtypes and the `BusinessRecord` shape that
//! the extraction pipeline produces and the export layer consumes.

use crate::error::CoreError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Maximum number of email addresses retained per business record.
pub const MAX_EMAILS_PER_RECORD: usize = 5;

/// Newtype for extraction session identifiers with validation.
///
/// Session IDs must be valid UUIDs (v4 format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new `SessionId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is not a valid UUID v4.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Create a new random `SessionId` using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that a string is a valid UUID v4.
    fn validate(id: &str) -> Result<(), CoreError> {
        static UUID_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = UUID_REGEX.get_or_init(|| {
            Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
                .expect("valid regex")
        });

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "invalid session ID: must be a valid UUID v4, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for caller (user) identifiers.
///
/// User IDs must be non-empty, at most 64 characters, with no whitespace.
/// The account system owning these identifiers is an external collaborator;
/// this type only enforces the shape the ledger and session store rely on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a new `UserId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is empty, too long, or contains whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() || id.len() > 64 {
            return Err(CoreError::Validation(format!(
                "invalid user ID: must be 1-64 characters, got {} characters",
                id.len()
            )));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(CoreError::Validation(format!(
                "invalid user ID: must not contain whitespace, got '{id}'"
            )));
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a record's email addresses were discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailProvenance {
    /// Found on the map-search detail page itself
    ResultsPage,
    /// Found by visiting the business website (or a contact subpage)
    WebsiteScan,
}

impl fmt::Display for EmailProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResultsPage => write!(f, "results_page"),
            Self::WebsiteScan => write!(f, "website_scan"),
        }
    }
}

/// One extracted business.
///
/// A record is only emitted by the pipeline when both `name` and `address`
/// are non-empty; records missing either are dropped silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessRecord {
    /// Display name of the business
    pub name: String,
    /// Postal address as shown on the detail page
    pub address: String,
    /// Phone number, if listed
    pub phone: Option<String>,
    /// Website URL, normalized to include a scheme
    pub website: Option<String>,
    /// Discovered email addresses, deduplicated case-insensitively, capped at 5
    pub emails: Vec<String>,
    /// Where the emails were found
    pub provenance: EmailProvenance,
    /// When the record was extracted
    pub extracted_at: DateTime<Utc>,
}

impl BusinessRecord {
    /// Create a record with the two required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            phone: None,
            website: None,
            emails: Vec::new(),
            provenance: EmailProvenance::ResultsPage,
            extracted_at: Utc::now(),
        }
    }

    /// Whether the record satisfies the emission invariant (non-empty name and address).
    #[must_use]
    pub fn has_required_fields(&self) -> bool {
        !self.name.trim().is_empty() && !self.address.trim().is_empty()
    }

    /// Append an email, preserving order, deduplicating case-insensitively,
    /// and enforcing the per-record cap.
    ///
    /// Returns true if the email was added.
    pub fn push_email(&mut self, email: impl Into<String>) -> bool {
        let email = email.into();
        if self.emails.len() >= MAX_EMAILS_PER_RECORD {
            return false;
        }
        let lowered = email.to_lowercase();
        if self.emails.iter().any(|e| e.to_lowercase() == lowered) {
            return false;
        }
        self.emails.push(email);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_valid() {
        let id = "550e8400-e29b-41d4-a716-446655440000";
        let session_id = SessionId::new(id).expect("valid session ID");
        assert_eq!(session_id.as_str(), id);
    }

    #[test]
    fn test_session_id_invalid() {
        let invalid_ids = vec![
            "not-a-uuid",
            "550e8400-e29b-51d4-a716-446655440000", // Wrong version
            "550e8400-e29b-41d4-x716-446655440000", // Invalid hex
            "",
        ];

        for id in invalid_ids {
            assert!(SessionId::new(id).is_err());
        }
    }

    #[test]
    fn test_session_id_generate() {
        let id1 = SessionId::generate();
        let id2 = SessionId::generate();
        assert_ne!(id1, id2); // Should be unique
    }

    #[test]
    fn test_user_id_valid() {
        for id in ["alice", "user-42", "a", "x@example.org"] {
            assert!(UserId::new(id).is_ok(), "Failed for: {id}");
        }
    }

    #[test]
    fn test_user_id_invalid() {
        let too_long = "a".repeat(65);
        for id in ["", "has space", "tab\there", too_long.as_str()] {
            assert!(UserId::new(id).is_err(), "Should fail for: {id}");
        }
    }

    #[test]
    fn test_record_required_fields() {
        let record = BusinessRecord::new("Bakkerij Vermeulen", "Oudegracht 12, Utrecht");
        assert!(record.has_required_fields());

        let record = BusinessRecord::new("", "Oudegracht 12, Utrecht");
        assert!(!record.has_required_fields());

        let record = BusinessRecord::new("Bakkerij Vermeulen", "   ");
        assert!(!record.has_required_fields());
    }

    #[test]
    fn test_push_email_dedup_case_insensitive() {
        let mut record = BusinessRecord::new("B", "A");
        assert!(record.push_email("info@biz.nl"));
        assert!(!record.push_email("INFO@biz.nl"));
        assert_eq!(record.emails, vec!["info@biz.nl"]);
    }

    #[test]
    fn test_push_email_cap() {
        let mut record = BusinessRecord::new("B", "A");
        for i in 0..MAX_EMAILS_PER_RECORD {
            assert!(record.push_email(format!("mail{i}@biz.nl")));
        }
        assert!(!record.push_email("extra@biz.nl"));
        assert_eq!(record.emails.len(), MAX_EMAILS_PER_RECORD);
    }

    #[test]
    fn test_provenance_serialization() {
        let json = serde_json::to_string(&EmailProvenance::WebsiteScan).expect("serialize");
        assert_eq!(json, "\"website_scan\"");
    }
}
