//! Identity Normalizer: canonical comparison keys for a record.
//!
//! Matching is always done on these keys, never on raw field strings. A key
//! that is absent is `None`, and `None` never matches anything, including
//! another `None`: missing data must not manufacture a duplicate.

use serde::{Deserialize, Serialize};

use crate::record::PersonRecord;

/// The content field a duplicate search groups on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyField {
  Email,
  NationalId,
}

impl KeyField {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Email => "email",
      Self::NationalId => "nationalId",
    }
  }
}

/// Canonical comparison keys derived from a record. Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedKey {
  /// Lowercased and trimmed.
  pub email:       Option<String>,
  /// Digits only.
  pub national_id: Option<String>,
}

impl NormalizedKey {
  /// A key carrying only `value` under `field`.
  pub fn only(field: KeyField, value: String) -> Self {
    match field {
      KeyField::Email => Self { email: Some(value), national_id: None },
      KeyField::NationalId => Self { email: None, national_id: Some(value) },
    }
  }

  pub fn get(&self, field: KeyField) -> Option<&str> {
    match field {
      KeyField::Email => self.email.as_deref(),
      KeyField::NationalId => self.national_id.as_deref(),
    }
  }
}

/// Derive the comparison keys for `record`.
pub fn normalize(record: &PersonRecord) -> NormalizedKey {
  NormalizedKey {
    email:       record.email.as_deref().and_then(normalize_email),
    national_id: record.national_id.as_deref().and_then(normalize_national_id),
  }
}

pub fn normalize_email(raw: &str) -> Option<String> {
  let email = raw.trim().to_lowercase();
  (!email.is_empty()).then_some(email)
}

pub fn normalize_national_id(raw: &str) -> Option<String> {
  let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
  (!digits.is_empty()).then_some(digits)
}
