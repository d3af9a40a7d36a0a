//! One function per subcommand. Each returns the JSON document to print.

use std::{path::Path, time::Duration};

use anyhow::{Context as _, Result};
use roster_core::{
  cleanup::{CleanupExecutor, CleanupOptions},
  detect::find_duplicates,
  fetch::{Fetcher, Scope},
  normalize::KeyField,
  policy::MostComplete,
  reconcile::{key_disagreements, unify},
  record::Namespace,
  report::{CrossCheckedDump, cleanup_response, maintenance_report},
};
use roster_store_sqlite::{NewDocument, SqliteStore};
use serde_json::Value;

use crate::PolicyArg;

pub struct Context {
  pub store:   SqliteStore,
  pub timeout: Duration,
}

impl Context {
  fn fetcher(&self) -> Fetcher<'_, SqliteStore> { Fetcher::new(&self.store, self.timeout) }
}

pub async fn unify_people(ctx: &Context, cross_check: bool) -> Result<Value> {
  let snapshot = ctx.fetcher().snapshot().await?;
  let people = unify(&snapshot.access, &snapshot.labor);

  let value = if cross_check {
    let conflicts = key_disagreements(&snapshot.access, &snapshot.labor);
    serde_json::to_value(CrossCheckedDump { people, conflicts })?
  } else {
    serde_json::to_value(people)?
  };
  Ok(value)
}

pub async fn duplicates(ctx: &Context, key: KeyField, scope: Scope) -> Result<Value> {
  let snapshot = ctx.fetcher().snapshot().await?;
  let groups = find_duplicates(&snapshot.scoped(scope), key);
  tracing::info!(key = key.as_str(), groups = groups.len(), "duplicate scan finished");
  Ok(serde_json::to_value(groups)?)
}

pub async fn report(ctx: &Context) -> Result<Value> {
  let snapshot = ctx.fetcher().snapshot().await?;
  let everyone = snapshot.scoped(Scope::Both);
  let email_groups = find_duplicates(&everyone, KeyField::Email);
  let dni_groups = find_duplicates(&everyone, KeyField::NationalId);
  Ok(serde_json::to_value(maintenance_report(
    &snapshot,
    &email_groups,
    &dni_groups,
  ))?)
}

pub async fn cleanup(
  ctx: &Context,
  options: CleanupOptions,
  policy: PolicyArg,
) -> Result<Value> {
  let executor = CleanupExecutor::new(ctx.fetcher(), options);
  let result = match policy {
    PolicyArg::Earliest => executor.run().await?,
    PolicyArg::MostComplete => executor.with_policy(MostComplete).run().await?,
  };

  Ok(serde_json::to_value(cleanup_response(&result))?)
}

pub async fn import(ctx: &Context, namespace: Namespace, file: &Path) -> Result<Value> {
  let raw = tokio::fs::read_to_string(file)
    .await
    .with_context(|| format!("reading {}", file.display()))?;
  let docs: Vec<NewDocument> = serde_json::from_str(&raw)
    .with_context(|| format!("parsing {} as a JSON array of documents", file.display()))?;

  let stored = ctx.store.insert_many(namespace, docs).await?;
  tracing::info!(%namespace, count = stored.len(), "imported documents");

  Ok(serde_json::json!({
    "namespace": namespace.collection(),
    "imported": stored.len(),
    "ids": stored.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
  }))
}
