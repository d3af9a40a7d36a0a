//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and document fields as compact
//! JSON objects.

use chrono::{DateTime, Utc};
use roster_core::store::StoredDocument;
use serde_json::{Map, Value};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Fields ──────────────────────────────────────────────────────────────────

pub fn encode_fields(fields: &Map<String, Value>) -> Result<String> {
  Ok(serde_json::to_string(fields)?)
}

pub fn decode_fields(id: &str, s: &str) -> Result<Map<String, Value>> {
  match serde_json::from_str(s)? {
    Value::Object(map) => Ok(map),
    _ => Err(Error::MalformedFields(id.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `documents` row.
pub struct RawDocument {
  pub id:          String,
  pub created_at:  String,
  pub fields_json: String,
}

impl RawDocument {
  pub fn into_document(self) -> Result<StoredDocument> {
    Ok(StoredDocument {
      created_at: decode_dt(&self.created_at)?,
      fields:     decode_fields(&self.id, &self.fields_json)?,
      id:         self.id,
    })
  }
}
