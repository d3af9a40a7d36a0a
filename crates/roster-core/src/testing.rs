//! Test fixtures: an in-memory `PersonnelStore` with injectable failures.

use std::{
  collections::{HashMap, HashSet},
  sync::Mutex,
  time::Duration,
};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
  record::{Namespace, PersonRecord},
  store::{DeleteOutcome, PersonnelStore, StoredDocument},
};

#[derive(Debug, thiserror::Error)]
#[error("memory store: {0}")]
pub struct MemoryError(String);

#[derive(Default)]
pub struct MemoryStore {
  docs:         Mutex<HashMap<Namespace, Vec<StoredDocument>>>,
  failing_ids:  Mutex<HashSet<String>>,
  fail_fetches: Mutex<bool>,
  latency:      Mutex<Option<Duration>>,
}

impl MemoryStore {
  pub fn put(&self, namespace: Namespace, doc: StoredDocument) {
    self.docs.lock().unwrap().entry(namespace).or_default().push(doc);
  }

  pub fn ids(&self, namespace: Namespace) -> Vec<String> {
    self
      .docs
      .lock()
      .unwrap()
      .get(&namespace)
      .map(|docs| docs.iter().map(|d| d.id.clone()).collect())
      .unwrap_or_default()
  }

  pub fn fail_delete(&self, id: &str) {
    self.failing_ids.lock().unwrap().insert(id.to_owned());
  }

  pub fn fail_fetches(&self) { *self.fail_fetches.lock().unwrap() = true; }

  pub fn set_latency(&self, latency: Duration) {
    *self.latency.lock().unwrap() = Some(latency);
  }

  async fn wait(&self) {
    let latency = *self.latency.lock().unwrap();
    if let Some(d) = latency {
      tokio::time::sleep(d).await;
    }
  }
}

impl PersonnelStore for MemoryStore {
  type Error = MemoryError;

  async fn fetch_all(&self, namespace: Namespace) -> Result<Vec<StoredDocument>, MemoryError> {
    self.wait().await;
    if *self.fail_fetches.lock().unwrap() {
      return Err(MemoryError("unavailable".into()));
    }
    Ok(self.docs.lock().unwrap().get(&namespace).cloned().unwrap_or_default())
  }

  async fn delete_by_id(&self, namespace: Namespace, id: &str) -> Result<DeleteOutcome, MemoryError> {
    self.wait().await;
    if self.failing_ids.lock().unwrap().contains(id) {
      return Err(MemoryError(format!("cannot delete {id}")));
    }
    let mut docs = self.docs.lock().unwrap();
    let Some(list) = docs.get_mut(&namespace) else {
      return Ok(DeleteOutcome::AlreadyAbsent);
    };
    let before = list.len();
    list.retain(|d| d.id != id);
    Ok(if list.len() < before { DeleteOutcome::Deleted } else { DeleteOutcome::AlreadyAbsent })
  }
}

pub fn at(secs: i64) -> DateTime<Utc> {
  DateTime::from_timestamp(secs, 0).unwrap()
}

/// A stored document; `fields` must be a JSON object.
pub fn doc(id: &str, created_secs: i64, fields: Value) -> StoredDocument {
  let Value::Object(fields) = fields else { panic!("fields must be an object") };
  StoredDocument { id: id.to_owned(), created_at: at(created_secs), fields }
}

pub fn record(namespace: Namespace, id: &str, created_secs: i64, fields: Value) -> PersonRecord {
  PersonRecord::from_document(namespace, doc(id, created_secs, fields))
}
