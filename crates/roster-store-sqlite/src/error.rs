//! Error type for `roster-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("document {id:?} already exists in {namespace}")]
  DuplicateId { namespace: String, id: String },

  #[error("stored fields for {0:?} are not a JSON object")]
  MalformedFields(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
