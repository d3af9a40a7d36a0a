//! Unification Reconciler: the document-id join of both namespaces.
//!
//! Joining is by id only. Two records with the same id are taken to be the
//! same person whatever their content says, and two records with the same
//! content keys but different ids are not joined. Content-keyed matching is
//! the detector's job.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  normalize::{KeyField, normalize},
  record::PersonRecord,
};

/// Keys written by [`UnifiedPersonView`] itself. Stored fields with these
/// names are dropped from the merged map so they cannot shadow them.
const RESERVED_KEYS: [&str; 3] = ["id", "hasAccess", "hasLaborProfile"];

/// One person as seen across both namespaces. Never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedPersonView {
  pub id:                String,
  pub has_access:        bool,
  pub has_labor_profile: bool,
  /// Access fields overlaid with labor fields; labor wins on collision.
  /// Never contains [`RESERVED_KEYS`].
  #[serde(flatten)]
  pub fields:            Map<String, Value>,
}

/// Join `access` and `labor` by id.
///
/// Output order is part of the contract: every access record in fetch order
/// (merged with its labor record when one shares its id), then the labor
/// records no access record claimed, in fetch order. Each id appears exactly
/// once.
pub fn unify(
  access: &[PersonRecord],
  labor: &[PersonRecord],
) -> Vec<UnifiedPersonView> {
  let mut labor_by_id: HashMap<&str, &PersonRecord> =
    HashMap::with_capacity(labor.len());
  for record in labor {
    labor_by_id.entry(record.id.as_str()).or_insert(record);
  }

  let mut emitted: HashSet<&str> = HashSet::with_capacity(access.len() + labor.len());
  let mut views = Vec::with_capacity(access.len() + labor.len());

  for record in access {
    if !emitted.insert(record.id.as_str()) {
      continue;
    }
    let matched = labor_by_id.get(record.id.as_str());
    let mut fields = Map::new();
    overlay(&mut fields, &record.fields);
    if let Some(profile) = matched {
      overlay(&mut fields, &profile.fields);
    }
    views.push(UnifiedPersonView {
      id: record.id.clone(),
      has_access: true,
      has_labor_profile: matched.is_some(),
      fields,
    });
  }

  for record in labor {
    if !emitted.insert(record.id.as_str()) {
      continue;
    }
    let mut fields = Map::new();
    overlay(&mut fields, &record.fields);
    views.push(UnifiedPersonView {
      id: record.id.clone(),
      has_access: false,
      has_labor_profile: true,
      fields,
    });
  }

  views
}

/// Copy `source` into `target`, overwriting collisions and skipping
/// [`RESERVED_KEYS`].
fn overlay(target: &mut Map<String, Value>, source: &Map<String, Value>) {
  for (key, value) in source {
    if !RESERVED_KEYS.contains(&key.as_str()) {
      target.insert(key.clone(), value.clone());
    }
  }
}

// ─── Cross-check ─────────────────────────────────────────────────────────────

/// An id-joined pair whose content keys disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityConflict {
  pub id:           String,
  pub field:        KeyField,
  pub access_value: String,
  pub labor_value:  String,
}

/// Report id-joined pairs whose normalized email or national ID differ.
///
/// Opt-in: [`unify`] never consults this. A key missing on either side is
/// not a disagreement.
pub fn key_disagreements(
  access: &[PersonRecord],
  labor: &[PersonRecord],
) -> Vec<IdentityConflict> {
  let mut labor_by_id: HashMap<&str, &PersonRecord> =
    HashMap::with_capacity(labor.len());
  for record in labor {
    labor_by_id.entry(record.id.as_str()).or_insert(record);
  }

  let mut conflicts = Vec::new();
  for record in access {
    let Some(profile) = labor_by_id.get(record.id.as_str()) else { continue };
    let (a, l) = (normalize(record), normalize(profile));
    for field in [KeyField::Email, KeyField::NationalId] {
      if let (Some(av), Some(lv)) = (a.get(field), l.get(field))
        && av != lv
      {
        tracing::warn!(id = %record.id, key = field.as_str(), "id-joined records disagree");
        conflicts.push(IdentityConflict {
          id:           record.id.clone(),
          field,
          access_value: av.to_owned(),
          labor_value:  lv.to_owned(),
        });
      }
    }
  }
  conflicts
}
