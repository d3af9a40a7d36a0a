//! Resolution Policy: which member of a duplicate group survives.
//!
//! Detection and resolution are separate so the survivor rule can be swapped
//! without touching grouping. A policy is an ordering over members; the
//! smallest member under that ordering is kept.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{
  detect::DuplicateGroup,
  normalize::KeyField,
  record::PersonRecord,
};

/// Why a record was marked for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalReason {
  #[serde(rename = "nationalId-duplicate")]
  NationalIdDuplicate,
  #[serde(rename = "email-duplicate")]
  EmailDuplicate,
}

impl RemovalReason {
  pub fn for_key(field: KeyField) -> Self {
    match field {
      KeyField::Email => Self::EmailDuplicate,
      KeyField::NationalId => Self::NationalIdDuplicate,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::NationalIdDuplicate => "nationalId-duplicate",
      Self::EmailDuplicate => "email-duplicate",
    }
  }
}

/// The decision for one duplicate group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionPlan {
  pub group:       DuplicateGroup,
  pub survivor_id: String,
  /// Every member except the survivor, in group order.
  pub removed_ids: Vec<String>,
  pub reason:      RemovalReason,
}

impl ResolutionPlan {
  /// The members marked for removal, in group order.
  pub fn removed(&self) -> impl Iterator<Item = &PersonRecord> {
    self
      .group
      .members
      .iter()
      .filter(|m| self.removed_ids.contains(&m.id))
  }
}

// ─── Policies ────────────────────────────────────────────────────────────────

/// A survivor rule, expressed as a preference ordering.
pub trait ResolutionPolicy: Send + Sync {
  /// `Ordering::Less` means `a` is preferred over `b` as the survivor. The
  /// ordering must be total so resolution is reproducible.
  fn rank(&self, a: &PersonRecord, b: &PersonRecord) -> Ordering;

  /// Pick the survivor of `group` and mark every other member for removal.
  fn resolve(&self, group: DuplicateGroup) -> ResolutionPlan {
    let survivor = group
      .members
      .iter()
      .enumerate()
      .min_by(|(_, a), (_, b)| self.rank(a, b))
      .map(|(idx, _)| idx);

    let survivor_id = survivor
      .map(|idx| group.members[idx].id.clone())
      .unwrap_or_default();
    let removed_ids = group
      .members
      .iter()
      .enumerate()
      .filter(|(idx, _)| Some(*idx) != survivor)
      .map(|(_, m)| m.id.clone())
      .collect();

    ResolutionPlan {
      reason: RemovalReason::for_key(group.matched_on),
      group,
      survivor_id,
      removed_ids,
    }
  }
}

/// Keep the oldest record; later ones are taken to be accidental
/// re-creations. Equal `created_at` values fall back to the id in ascending
/// lexical order.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarliestCreated;

impl ResolutionPolicy for EarliestCreated {
  fn rank(&self, a: &PersonRecord, b: &PersonRecord) -> Ordering {
    a.created_at
      .cmp(&b.created_at)
      .then_with(|| a.id.cmp(&b.id))
  }
}

/// Keep the record with the most recognised fields filled in; ties fall back
/// to [`EarliestCreated`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MostComplete;

impl ResolutionPolicy for MostComplete {
  fn rank(&self, a: &PersonRecord, b: &PersonRecord) -> Ordering {
    b.completeness()
      .cmp(&a.completeness())
      .then_with(|| EarliestCreated.rank(a, b))
  }
}

/// Resolve `group` under the default [`EarliestCreated`] policy.
pub fn resolve(group: DuplicateGroup) -> ResolutionPlan {
  EarliestCreated.resolve(group)
}
