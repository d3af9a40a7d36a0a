//! PersonRecord: the typed form of a document from either namespace.
//!
//! Documents arrive from the store as loosely shaped field maps. They are
//! validated exactly once, in [`PersonRecord::from_document`], and everything
//! downstream works on the typed fields.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::StoredDocument;

// ─── Field names ─────────────────────────────────────────────────────────────

pub const EMAIL_FIELD: &str = "email";
pub const NATIONAL_ID_FIELD: &str = "dni";
pub const NAME_FIELD: &str = "name";
pub const ROLE_FIELD: &str = "role";
pub const STATUS_FIELD: &str = "status";

// ─── Namespace ───────────────────────────────────────────────────────────────

/// The two record namespaces kept in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Namespace {
  /// Authentication-enabled users.
  AccessIdentity,
  /// HR / employee records, independent of login capability.
  LaborProfile,
}

impl Namespace {
  /// The collection name the namespace is stored under.
  pub fn collection(self) -> &'static str {
    match self {
      Self::AccessIdentity => "users",
      Self::LaborProfile => "employees",
    }
  }
}

impl fmt::Display for Namespace {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.collection())
  }
}

// ─── PersonRecord ────────────────────────────────────────────────────────────

/// A person as recorded in one namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
  pub id:          String,
  pub namespace:   Namespace,
  pub email:       Option<String>,
  pub national_id: Option<String>,
  pub name:        Option<String>,
  pub role:        Option<String>,
  pub status:      Option<String>,
  pub created_at:  DateTime<Utc>,
  /// The complete document as stored, recognised fields included.
  pub fields:      Map<String, Value>,
}

impl PersonRecord {
  /// Validate a raw document into a typed record.
  ///
  /// Recognised fields holding a string are taken as-is, numbers are rendered
  /// in decimal (national IDs are often stored numerically). Any other value
  /// is treated as absent and logged.
  pub fn from_document(namespace: Namespace, doc: StoredDocument) -> Self {
    let text = |key: &str| text_field(&doc.fields, key, namespace, &doc.id);

    Self {
      email:       text(EMAIL_FIELD),
      national_id: text(NATIONAL_ID_FIELD),
      name:        text(NAME_FIELD),
      role:        text(ROLE_FIELD),
      status:      text(STATUS_FIELD),
      id:          doc.id,
      namespace,
      created_at:  doc.created_at,
      fields:      doc.fields,
    }
  }

  /// Number of recognised fields carrying a non-blank value.
  pub fn completeness(&self) -> usize {
    [&self.email, &self.national_id, &self.name, &self.role, &self.status]
      .into_iter()
      .filter(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
      .count()
  }
}

fn text_field(
  fields: &Map<String, Value>,
  key: &str,
  namespace: Namespace,
  id: &str,
) -> Option<String> {
  match fields.get(key)? {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Null => None,
    other => {
      tracing::warn!(
        collection = %namespace,
        id,
        field = key,
        value = %other,
        "ignoring non-text value for recognised field"
      );
      None
    }
  }
}
