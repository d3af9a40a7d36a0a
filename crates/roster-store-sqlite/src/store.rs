//! [`SqliteStore`]: the SQLite implementation of [`PersonnelStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use roster_core::{
  record::Namespace,
  store::{DeleteOutcome, PersonnelStore, StoredDocument},
};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{RawDocument, encode_dt, encode_fields},
  schema::SCHEMA,
};

// ─── Input ───────────────────────────────────────────────────────────────────

/// A document to insert. Missing ids are generated; a missing `createdAt`
/// defaults to now.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
  pub id:         Option<String>,
  pub created_at: Option<DateTime<Utc>>,
  #[serde(flatten)]
  pub fields:     Map<String, Value>,
}

impl NewDocument {
  pub fn new(fields: Map<String, Value>) -> Self {
    Self { id: None, created_at: None, fields }
  }

  fn into_stored(self) -> StoredDocument {
    StoredDocument {
      id:         self.id.unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
      created_at: self.created_at.unwrap_or_else(Utc::now),
      fields:     self.fields,
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A personnel store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests and dry runs.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert one document into `namespace`.
  pub async fn insert(
    &self,
    namespace: Namespace,
    doc: NewDocument,
  ) -> Result<StoredDocument> {
    let stored = doc.into_stored();
    self.write(namespace, std::slice::from_ref(&stored)).await?;
    Ok(stored)
  }

  /// Insert `docs` into `namespace` in one transaction, preserving their
  /// order. Nothing is written if any id is already taken.
  pub async fn insert_many(
    &self,
    namespace: Namespace,
    docs: Vec<NewDocument>,
  ) -> Result<Vec<StoredDocument>> {
    let stored: Vec<StoredDocument> =
      docs.into_iter().map(NewDocument::into_stored).collect();
    self.write(namespace, &stored).await?;
    Ok(stored)
  }

  async fn write(&self, namespace: Namespace, docs: &[StoredDocument]) -> Result<()> {
    let rows = docs
      .iter()
      .map(|d| Ok((d.id.clone(), encode_dt(d.created_at), encode_fields(&d.fields)?)))
      .collect::<Result<Vec<_>>>()?;
    let ns_str = namespace.collection().to_owned();

    let duplicate: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for (id, created_at, fields_json) in rows {
          let changed = tx.execute(
            "INSERT OR IGNORE INTO documents (namespace, id, created_at, fields_json)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![ns_str, id, created_at, fields_json],
          )?;
          if changed == 0 {
            // Dropping the transaction rolls it back.
            return Ok(Some(id));
          }
        }
        tx.commit()?;
        Ok(None)
      })
      .await?;

    if let Some(id) = duplicate {
      return Err(Error::DuplicateId { namespace: namespace.to_string(), id });
    }

    tracing::debug!(collection = %namespace, count = docs.len(), "inserted documents");
    Ok(())
  }
}

// ─── PersonnelStore impl ─────────────────────────────────────────────────────

impl PersonnelStore for SqliteStore {
  type Error = Error;

  async fn fetch_all(&self, namespace: Namespace) -> Result<Vec<StoredDocument>> {
    let ns_str = namespace.collection().to_owned();

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, created_at, fields_json
           FROM documents
           WHERE namespace = ?1
           ORDER BY seq",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![ns_str], |row| {
            Ok(RawDocument {
              id:          row.get(0)?,
              created_at:  row.get(1)?,
              fields_json: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_document).collect()
  }

  async fn delete_by_id(&self, namespace: Namespace, id: &str) -> Result<DeleteOutcome> {
    let ns_str = namespace.collection().to_owned();
    let id_str = id.to_owned();

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM documents WHERE namespace = ?1 AND id = ?2",
          rusqlite::params![ns_str, id_str],
        )?)
      })
      .await?;

    Ok(if changed == 0 { DeleteOutcome::AlreadyAbsent } else { DeleteOutcome::Deleted })
  }
}
