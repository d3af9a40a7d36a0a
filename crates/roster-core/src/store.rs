//! The `PersonnelStore` trait and the raw document shape it returns.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! The core only ever reads both namespaces and deletes single documents; it
//! never writes fields.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::Namespace;

/// A document exactly as the store holds it. Shape is validated by the
/// [`Fetcher`](crate::fetch::Fetcher), not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
  /// Store-assigned, immutable, unique within its namespace.
  pub id:         String,
  pub created_at: DateTime<Utc>,
  /// Every field of the document except the id.
  pub fields:     Map<String, Value>,
}

/// Outcome of a successful [`PersonnelStore::delete_by_id`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
  Deleted,
  /// Nothing was stored under that id. Callers treat this as success.
  AlreadyAbsent,
}

/// Abstraction over the document store holding both namespaces.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PersonnelStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return every document in `namespace`, in the store's natural order.
  fn fetch_all(
    &self,
    namespace: Namespace,
  ) -> impl Future<Output = Result<Vec<StoredDocument>, Self::Error>> + Send + '_;

  /// Delete a single document. A missing document is
  /// [`DeleteOutcome::AlreadyAbsent`], never an error.
  fn delete_by_id<'a>(
    &'a self,
    namespace: Namespace,
    id: &'a str,
  ) -> impl Future<Output = Result<DeleteOutcome, Self::Error>> + Send + 'a;
}
