//! Duplicate Detector: content-keyed grouping of records.
//!
//! Grouping is by normalized email or national ID and is independent of
//! document ids. The detector does not know or care which namespace its
//! input came from; callers choose the scope by choosing the records.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
  normalize::{KeyField, NormalizedKey, normalize},
  record::PersonRecord,
};

/// Records from at least two distinct document ids sharing a non-null
/// normalized key value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
  /// Carries only the value under `matched_on`.
  pub match_key:         NormalizedKey,
  pub matched_on:        KeyField,
  /// In input order.
  pub members:           Vec<PersonRecord>,
  /// The members disagree on their name, so they may not be the same
  /// person. Such a group must be surfaced, never merged silently.
  pub has_name_conflict: bool,
}

impl DuplicateGroup {
  /// The shared key value.
  pub fn key_value(&self) -> &str {
    self.match_key.get(self.matched_on).unwrap_or_default()
  }

  /// Distinct non-blank names across the members, in first-seen order.
  pub fn distinct_names(&self) -> Vec<String> {
    distinct_names(&self.members)
  }
}

/// Group `records` by their normalized `key_field`.
///
/// Records without that key are never grouped. A group needs at least two
/// distinct document ids, so an access identity and the labor profile
/// id-joined to it do not duplicate each other. Groups come back in the
/// order their key was first seen.
pub fn find_duplicates(
  records: &[PersonRecord],
  key_field: KeyField,
) -> Vec<DuplicateGroup> {
  let mut order: Vec<String> = Vec::new();
  let mut buckets: HashMap<String, Vec<&PersonRecord>> = HashMap::new();

  for record in records {
    let Some(value) = normalize(record).get(key_field).map(str::to_owned) else {
      continue;
    };
    buckets
      .entry(value)
      .or_insert_with_key(|k| {
        order.push(k.clone());
        Vec::new()
      })
      .push(record);
  }

  order
    .into_iter()
    .filter_map(|value| {
      let members = buckets.remove(&value)?;
      let distinct_ids: HashSet<&str> = members.iter().map(|m| m.id.as_str()).collect();
      if distinct_ids.len() < 2 {
        return None;
      }
      let members: Vec<PersonRecord> = members.into_iter().cloned().collect();
      let has_name_conflict = has_name_conflict(&members);
      if has_name_conflict {
        tracing::warn!(
          key = key_field.as_str(),
          value = %value,
          members = members.len(),
          "duplicate group has conflicting names"
        );
      }
      Some(DuplicateGroup {
        match_key: NormalizedKey::only(key_field, value),
        matched_on: key_field,
        members,
        has_name_conflict,
      })
    })
    .collect()
}

/// True when the members carry more than one distinct name once trimmed and
/// case-folded. Members without a name do not count.
pub fn has_name_conflict(members: &[PersonRecord]) -> bool {
  members
    .iter()
    .filter_map(|m| canonical_name(m.name.as_deref()))
    .collect::<HashSet<_>>()
    .len()
    > 1
}

fn canonical_name(name: Option<&str>) -> Option<String> {
  let name = name?.trim().to_lowercase();
  (!name.is_empty()).then_some(name)
}

fn distinct_names(members: &[PersonRecord]) -> Vec<String> {
  let mut seen = HashSet::new();
  members
    .iter()
    .filter_map(|m| {
      let canonical = canonical_name(m.name.as_deref())?;
      seen.insert(canonical).then(|| m.name.as_deref().unwrap_or_default().trim().to_owned())
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::{record::Namespace, testing::record};

  fn employee(id: &str, fields: serde_json::Value) -> PersonRecord {
    record(Namespace::LaborProfile, id, 1, fields)
  }

  #[test]
  fn groups_by_normalized_email() {
    let records = vec![
      employee("e1", json!({ "email": "Ana@Example.com" })),
      employee("e2", json!({ "email": "bob@example.com" })),
      employee("e3", json!({ "email": "  ana@example.COM " })),
    ];

    let groups = find_duplicates(&records, KeyField::Email);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key_value(), "ana@example.com");
    assert_eq!(groups[0].matched_on, KeyField::Email);
    let ids: Vec<_> = groups[0].members.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["e1", "e3"]);
  }

  #[test]
  fn groups_by_digits_of_national_id() {
    let records = vec![
      employee("e1", json!({ "dni": "12.345.678" })),
      employee("e2", json!({ "dni": 12345678 })),
    ];
    let groups = find_duplicates(&records, KeyField::NationalId);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key_value(), "12345678");
  }

  #[test]
  fn null_keys_are_never_grouped() {
    let records = vec![
      employee("e1", json!({})),
      employee("e2", json!({ "email": null })),
      employee("e3", json!({ "email": "   " })),
      employee("e4", json!({ "dni": "abc" })),
      employee("e5", json!({ "dni": "" })),
    ];
    assert!(find_duplicates(&records, KeyField::Email).is_empty());
    assert!(find_duplicates(&records, KeyField::NationalId).is_empty());
  }

  #[test]
  fn a_missing_key_never_joins_a_present_one() {
    let records = vec![
      employee("e1", json!({ "email": "a@x.io", "dni": "1" })),
      employee("e2", json!({ "email": "a@x.io" })),
      employee("e3", json!({ "dni": "" })),
    ];
    assert!(find_duplicates(&records, KeyField::NationalId).is_empty());
    assert_eq!(find_duplicates(&records, KeyField::Email).len(), 1);
  }

  #[test]
  fn groups_keep_first_seen_order() {
    let records = vec![
      employee("e1", json!({ "email": "b@x.io" })),
      employee("e2", json!({ "email": "a@x.io" })),
      employee("e3", json!({ "email": "a@x.io" })),
      employee("e4", json!({ "email": "b@x.io" })),
    ];
    let groups = find_duplicates(&records, KeyField::Email);
    let keys: Vec<_> = groups.iter().map(DuplicateGroup::key_value).collect();
    assert_eq!(keys, ["b@x.io", "a@x.io"]);
  }

  #[test]
  fn differing_names_flag_a_conflict() {
    let records = vec![
      employee("e1", json!({ "email": "shared@example.com", "name": "Ana" })),
      employee("e2", json!({ "email": "shared@example.com", "name": "Bruno" })),
    ];
    let groups = find_duplicates(&records, KeyField::Email);
    assert_eq!(groups.len(), 1);
    assert!(groups[0].has_name_conflict);
    assert_eq!(groups[0].distinct_names(), ["Ana", "Bruno"]);
  }

  #[test]
  fn names_differing_only_in_case_and_spacing_do_not_conflict() {
    let records = vec![
      employee("e1", json!({ "email": "a@x.io", "name": "Ana Perez" })),
      employee("e2", json!({ "email": "a@x.io", "name": " ana perez " })),
      employee("e3", json!({ "email": "a@x.io" })),
    ];
    let groups = find_duplicates(&records, KeyField::Email);
    assert!(!groups[0].has_name_conflict);
  }

  #[test]
  fn id_joined_pair_is_not_a_duplicate() {
    let records = vec![
      record(Namespace::AccessIdentity, "u1", 1, json!({ "email": "a@x.io" })),
      record(Namespace::LaborProfile, "u1", 2, json!({ "email": "A@x.io" })),
    ];
    assert!(find_duplicates(&records, KeyField::Email).is_empty());
  }

  #[test]
  fn id_joined_pair_stays_in_a_group_with_another_id() {
    let records = vec![
      record(Namespace::AccessIdentity, "u1", 1, json!({ "email": "a@x.io" })),
      record(Namespace::LaborProfile, "u1", 2, json!({ "email": "a@x.io" })),
      record(Namespace::LaborProfile, "e7", 3, json!({ "email": "a@x.io" })),
    ];
    let groups = find_duplicates(&records, KeyField::Email);
    assert_eq!(groups.len(), 1);
    let ids: Vec<_> = groups[0].members.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["u1", "u1", "e7"]);
  }

  #[test]
  fn scope_is_just_the_input() {
    let records = vec![
      record(Namespace::AccessIdentity, "u1", 1, json!({ "email": "a@x.io" })),
      record(Namespace::LaborProfile, "e1", 2, json!({ "email": "a@x.io" })),
    ];
    let across = find_duplicates(&records, KeyField::Email);
    assert_eq!(across.len(), 1);

    let labor_only: Vec<_> = records
      .iter()
      .filter(|r| r.namespace == Namespace::LaborProfile)
      .cloned()
      .collect();
    assert!(find_duplicates(&labor_only, KeyField::Email).is_empty());
  }
}
