//! Record Fetcher: the I/O boundary that pulls namespace snapshots.
//!
//! The only place store errors and timeouts are translated into the core
//! [`Error`] taxonomy, and the only place raw documents are shape-checked.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  error::Timeout,
  record::{Namespace, PersonRecord},
  store::PersonnelStore,
};

/// Applied to every store call unless the caller configures otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Which namespaces a detector run looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
  Users,
  Employees,
  #[default]
  Both,
}

/// Both namespaces, fetched for the duration of one invocation.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  pub access: Vec<PersonRecord>,
  pub labor:  Vec<PersonRecord>,
}

impl Snapshot {
  /// The records a detector run over `scope` should see. For
  /// [`Scope::Both`], access records come first.
  pub fn scoped(&self, scope: Scope) -> Vec<PersonRecord> {
    match scope {
      Scope::Users => self.access.clone(),
      Scope::Employees => self.labor.clone(),
      Scope::Both => self.access.iter().chain(&self.labor).cloned().collect(),
    }
  }
}

/// Reads namespaces from a store handle owned by the caller.
pub struct Fetcher<'a, S> {
  store:   &'a S,
  timeout: Duration,
}

impl<'a, S: PersonnelStore> Fetcher<'a, S> {
  pub fn new(store: &'a S, timeout: Duration) -> Self { Self { store, timeout } }

  pub fn store(&self) -> &'a S { self.store }

  pub fn timeout(&self) -> Duration { self.timeout }

  /// Fetch and validate every record in `namespace`, in store order.
  pub async fn fetch(&self, namespace: Namespace) -> Result<Vec<PersonRecord>> {
    let operation = format!("fetch {namespace}");

    let docs =
      match tokio::time::timeout(self.timeout, self.store.fetch_all(namespace)).await {
        Ok(Ok(docs)) => docs,
        Ok(Err(e)) => return Err(Error::connection(operation, e)),
        Err(_) => return Err(Error::connection(operation, Timeout(self.timeout))),
      };

    let records: Vec<PersonRecord> = docs
      .into_iter()
      .map(|doc| PersonRecord::from_document(namespace, doc))
      .collect();

    tracing::info!(collection = %namespace, count = records.len(), "fetched records");
    Ok(records)
  }

  /// Fetch both namespaces concurrently.
  pub async fn snapshot(&self) -> Result<Snapshot> {
    let (access, labor) = tokio::try_join!(
      self.fetch(Namespace::AccessIdentity),
      self.fetch(Namespace::LaborProfile),
    )?;
    Ok(Snapshot { access, labor })
  }
}
