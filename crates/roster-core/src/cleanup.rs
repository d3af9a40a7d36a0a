//! Cleanup Executor: two-pass removal of duplicate labor profiles.
//!
//! Pass 1 groups by national ID, pass 2 by email over whatever pass 1 left
//! active, so one physical duplicate is never counted under both reasons.
//! Every record moves through `Active → PendingRemoval → Removed`; a failed
//! delete leaves it pending, is logged in the result, and the run carries on.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  detect::{DuplicateGroup, find_duplicates},
  error::Timeout,
  fetch::Fetcher,
  normalize::KeyField,
  policy::{EarliestCreated, RemovalReason, ResolutionPlan, ResolutionPolicy},
  record::{Namespace, PersonRecord},
  store::{DeleteOutcome, PersonnelStore},
};

/// The only namespace cleanup ever deletes from.
const TARGET: Namespace = Namespace::LaborProfile;

// ─── Options ─────────────────────────────────────────────────────────────────

/// What to do with a duplicate group whose members disagree on their name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameConflictMode {
  /// Leave the group alone; it is only reported.
  #[default]
  Skip,
  /// Resolve it like any other group; it is still reported.
  Resolve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupOptions {
  pub national_id_conflicts: NameConflictMode,
  pub email_conflicts:       NameConflictMode,
  /// Plan removals without deleting anything.
  pub dry_run:               bool,
}

impl Default for CleanupOptions {
  fn default() -> Self {
    Self {
      national_id_conflicts: NameConflictMode::Resolve,
      email_conflicts:       NameConflictMode::Skip,
      dry_run:               false,
    }
  }
}

impl CleanupOptions {
  fn conflict_mode(&self, field: KeyField) -> NameConflictMode {
    match field {
      KeyField::NationalId => self.national_id_conflicts,
      KeyField::Email => self.email_conflicts,
    }
  }
}

// ─── Result ──────────────────────────────────────────────────────────────────

/// Audit entry for one removed (or, in a dry run, to-be-removed) record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedRecord {
  pub id:            String,
  pub reason:        RemovalReason,
  pub name:          Option<String>,
  pub national_id:   Option<String>,
  pub email:         Option<String>,
  pub survivor_id:   String,
  /// The group this record was removed from had conflicting names.
  pub name_conflict: bool,
}

/// A delete that did not go through. The record is still in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalFailure {
  pub id:     String,
  pub reason: RemovalReason,
  pub error:  String,
}

/// A name-conflicted group, surfaced separately from clean duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbiguousGroup {
  pub matched_on: KeyField,
  pub key:        String,
  pub member_ids: Vec<String>,
  pub names:      Vec<String>,
  /// Whether the executor went ahead and resolved it anyway.
  pub resolved:   bool,
}

impl AmbiguousGroup {
  fn new(group: &DuplicateGroup, resolved: bool) -> Self {
    Self {
      matched_on: group.matched_on,
      key: group.key_value().to_owned(),
      member_ids: group.members.iter().map(|m| m.id.clone()).collect(),
      names: group.distinct_names(),
      resolved,
    }
  }
}

/// Outcome of one cleanup invocation. Returned to the caller, never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResult {
  pub deleted_count:          usize,
  pub deleted_by_national_id: usize,
  pub deleted_by_email:       usize,
  pub records:                Vec<RemovedRecord>,
  pub failures:               Vec<RemovalFailure>,
  pub warnings:               Vec<AmbiguousGroup>,
  pub dry_run:                bool,
}

impl CleanupResult {
  fn record_removal(&mut self, entry: RemovedRecord) {
    match entry.reason {
      RemovalReason::NationalIdDuplicate => self.deleted_by_national_id += 1,
      RemovalReason::EmailDuplicate => self.deleted_by_email += 1,
    }
    self.deleted_count = self.deleted_by_national_id + self.deleted_by_email;
    self.records.push(entry);
  }
}

// ─── Record state ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecordState {
  Active,
  PendingRemoval,
  Removed,
}

/// Per-record state for one run.
pub(crate) struct Ledger {
  states: HashMap<String, RecordState>,
}

impl Ledger {
  pub(crate) fn new(records: &[PersonRecord]) -> Self {
    Self {
      states: records
        .iter()
        .map(|r| (r.id.clone(), RecordState::Active))
        .collect(),
    }
  }

  pub(crate) fn state(&self, id: &str) -> Option<RecordState> {
    self.states.get(id).copied()
  }

  pub(crate) fn is_active(&self, id: &str) -> bool {
    self.state(id) == Some(RecordState::Active)
  }

  /// `Active → PendingRemoval`. Returns false for any other starting state.
  pub(crate) fn mark_pending(&mut self, id: &str) -> bool {
    match self.states.get_mut(id) {
      Some(state @ RecordState::Active) => {
        *state = RecordState::PendingRemoval;
        true
      }
      _ => false,
    }
  }

  /// `PendingRemoval → Removed`. Returns false for any other starting state.
  pub(crate) fn mark_removed(&mut self, id: &str) -> bool {
    match self.states.get_mut(id) {
      Some(state @ RecordState::PendingRemoval) => {
        *state = RecordState::Removed;
        true
      }
      _ => false,
    }
  }
}

// ─── Executor ────────────────────────────────────────────────────────────────

/// Applies resolution plans to the labor-profile namespace.
pub struct CleanupExecutor<'a, S, P = EarliestCreated> {
  fetcher: Fetcher<'a, S>,
  policy:  P,
  options: CleanupOptions,
}

impl<'a, S: PersonnelStore> CleanupExecutor<'a, S> {
  pub fn new(fetcher: Fetcher<'a, S>, options: CleanupOptions) -> Self {
    Self { fetcher, policy: EarliestCreated, options }
  }
}

impl<'a, S, P> CleanupExecutor<'a, S, P>
where
  S: PersonnelStore,
  P: ResolutionPolicy,
{
  /// Swap in a different survivor rule.
  pub fn with_policy<Q: ResolutionPolicy>(self, policy: Q) -> CleanupExecutor<'a, S, Q> {
    CleanupExecutor { fetcher: self.fetcher, policy, options: self.options }
  }

  /// Fetch the labor-profile namespace and clean it.
  ///
  /// Only the fetch can fail; individual delete failures are reported in the
  /// returned [`CleanupResult`].
  pub async fn run(&self) -> Result<CleanupResult> {
    let records = self.fetcher.fetch(TARGET).await?;
    Ok(self.apply(&records).await)
  }

  /// Clean an already fetched labor-profile snapshot.
  pub async fn apply(&self, records: &[PersonRecord]) -> CleanupResult {
    let mut ledger = Ledger::new(records);
    let mut result = CleanupResult { dry_run: self.options.dry_run, ..Default::default() };

    for field in [KeyField::NationalId, KeyField::Email] {
      let pool: Vec<PersonRecord> = records
        .iter()
        .filter(|r| ledger.is_active(&r.id))
        .cloned()
        .collect();

      for group in find_duplicates(&pool, field) {
        if group.has_name_conflict {
          let resolve = self.options.conflict_mode(field) == NameConflictMode::Resolve;
          result.warnings.push(AmbiguousGroup::new(&group, resolve));
          if !resolve {
            tracing::warn!(
              key = field.as_str(),
              value = %group.key_value(),
              "skipping duplicate group with conflicting names"
            );
            continue;
          }
        }
        let plan = self.policy.resolve(group);
        self.execute(&plan, &mut ledger, &mut result).await;
      }
    }

    tracing::info!(
      deleted = result.deleted_count,
      by_national_id = result.deleted_by_national_id,
      by_email = result.deleted_by_email,
      failures = result.failures.len(),
      warnings = result.warnings.len(),
      dry_run = result.dry_run,
      "cleanup finished"
    );
    result
  }

  async fn execute(
    &self,
    plan: &ResolutionPlan,
    ledger: &mut Ledger,
    result: &mut CleanupResult,
  ) {
    for record in plan.removed() {
      if !ledger.mark_pending(&record.id) {
        continue;
      }

      let entry = RemovedRecord {
        id:            record.id.clone(),
        reason:        plan.reason,
        name:          record.name.clone(),
        national_id:   record.national_id.clone(),
        email:         record.email.clone(),
        survivor_id:   plan.survivor_id.clone(),
        name_conflict: plan.group.has_name_conflict,
      };

      if self.options.dry_run {
        result.record_removal(entry);
        continue;
      }

      match self.delete(&record.id).await {
        Ok(outcome) => {
          if outcome == DeleteOutcome::AlreadyAbsent {
            tracing::debug!(id = %record.id, "record already absent");
          }
          ledger.mark_removed(&record.id);
          tracing::info!(
            id = %record.id,
            kept = %plan.survivor_id,
            reason = plan.reason.as_str(),
            "removed duplicate"
          );
          result.record_removal(entry);
        }
        Err(error) => {
          tracing::warn!(id = %record.id, %error, "failed to remove duplicate");
          result.failures.push(RemovalFailure {
            id: record.id.clone(),
            reason: plan.reason,
            error,
          });
        }
      }
    }
  }

  async fn delete(&self, id: &str) -> Result<DeleteOutcome, String> {
    let store = self.fetcher.store();
    match tokio::time::timeout(self.fetcher.timeout(), store.delete_by_id(TARGET, id)).await {
      Ok(Ok(outcome)) => Ok(outcome),
      Ok(Err(e)) => Err(e.to_string()),
      Err(_) => Err(Timeout(self.fetcher.timeout()).to_string()),
    }
  }
}
