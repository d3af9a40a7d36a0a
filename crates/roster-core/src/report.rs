//! Reporter: caller-facing payload shapes.
//!
//! Pure presentation. Nothing here decides anything; it only renders what the
//! reconciler, detector and executor produced.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
  cleanup::{AmbiguousGroup, CleanupResult, RemovalFailure},
  detect::DuplicateGroup,
  fetch::Snapshot,
  normalize::normalize,
  policy::RemovalReason,
  reconcile::{IdentityConflict, UnifiedPersonView},
  record::PersonRecord,
};

// ─── Cleanup ─────────────────────────────────────────────────────────────────

/// Body of `POST /cleanup-duplicates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
  pub deleted: usize,
  pub details: CleanupDetails,
  pub message: String,
  pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupDetails {
  pub deleted_by_dni:   usize,
  pub deleted_by_email: usize,
  pub records:          Vec<CleanupEntry>,
  pub failures:         Vec<RemovalFailure>,
  pub warnings:         Vec<AmbiguousGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupEntry {
  pub reason:        RemovalReason,
  pub name:          Option<String>,
  pub dni:           Option<String>,
  pub email:         Option<String>,
  pub id:            String,
  /// Id of the record that was kept in this record's place.
  pub kept:          String,
  pub name_conflict: bool,
}

pub fn cleanup_response(result: &CleanupResult) -> CleanupResponse {
  let records = result
    .records
    .iter()
    .map(|r| CleanupEntry {
      reason:        r.reason,
      name:          r.name.clone(),
      dni:           r.national_id.clone(),
      email:         r.email.clone(),
      id:            r.id.clone(),
      kept:          r.survivor_id.clone(),
      name_conflict: r.name_conflict,
    })
    .collect();

  CleanupResponse {
    deleted: result.deleted_count,
    details: CleanupDetails {
      deleted_by_dni: result.deleted_by_national_id,
      deleted_by_email: result.deleted_by_email,
      records,
      failures: result.failures.clone(),
      warnings: result.warnings.clone(),
    },
    message: cleanup_message(result),
    dry_run: result.dry_run,
  }
}

fn cleanup_message(result: &CleanupResult) -> String {
  let mut message = match (result.deleted_count, result.dry_run) {
    (0, _) => "No duplicate employee records to remove".to_owned(),
    (n, false) => format!(
      "Removed {n} duplicate employee record(s) ({} by DNI, {} by email)",
      result.deleted_by_national_id, result.deleted_by_email
    ),
    (n, true) => format!(
      "Dry run: {n} duplicate employee record(s) would be removed ({} by DNI, {} by email)",
      result.deleted_by_national_id, result.deleted_by_email
    ),
  };
  if !result.failures.is_empty() {
    message.push_str(&format!("; {} deletion(s) failed", result.failures.len()));
  }
  let unresolved = result.warnings.iter().filter(|w| !w.resolved).count();
  if unresolved > 0 {
    message.push_str(&format!(
      "; {unresolved} group(s) with conflicting names left for review"
    ));
  }
  message
}

// ─── Deep maintenance report ─────────────────────────────────────────────────

/// Body of `GET /maintenance-deep`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceReport {
  pub users_count:     usize,
  pub employees_count: usize,
  pub unique_emails:   usize,
  pub duplicates:      Vec<EmailDuplicates>,
  pub dni_duplicates:  Vec<DniDuplicates>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailDuplicates {
  pub email:   String,
  pub records: Vec<DuplicateMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DniDuplicates {
  pub dni:     String,
  pub records: Vec<DuplicateMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateMember {
  pub id:          String,
  /// `"users"` or `"employees"`.
  pub source:      String,
  pub name:        String,
  /// The member's group has conflicting names.
  pub has_warning: bool,
}

/// Render cross-namespace detector output over `snapshot`.
pub fn maintenance_report(
  snapshot: &Snapshot,
  email_groups: &[DuplicateGroup],
  dni_groups: &[DuplicateGroup],
) -> MaintenanceReport {
  let unique_emails = snapshot
    .access
    .iter()
    .chain(&snapshot.labor)
    .filter_map(|r| normalize(r).email)
    .collect::<HashSet<_>>()
    .len();

  MaintenanceReport {
    users_count: snapshot.access.len(),
    employees_count: snapshot.labor.len(),
    unique_emails,
    duplicates: email_groups
      .iter()
      .map(|g| EmailDuplicates { email: g.key_value().to_owned(), records: members(g) })
      .collect(),
    dni_duplicates: dni_groups
      .iter()
      .map(|g| DniDuplicates { dni: g.key_value().to_owned(), records: members(g) })
      .collect(),
  }
}

fn members(group: &DuplicateGroup) -> Vec<DuplicateMember> {
  group.members.iter().map(|m| member(m, group.has_name_conflict)).collect()
}

fn member(record: &PersonRecord, has_warning: bool) -> DuplicateMember {
  DuplicateMember {
    id: record.id.clone(),
    source: record.namespace.collection().to_owned(),
    name: record.name.clone().unwrap_or_default(),
    has_warning,
  }
}

// ─── Unification dump ────────────────────────────────────────────────────────

/// Unified views plus the opt-in id/content cross-check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossCheckedDump {
  pub people:    Vec<UnifiedPersonView>,
  pub conflicts: Vec<IdentityConflict>,
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::{
    cleanup::RemovedRecord,
    detect::find_duplicates,
    normalize::KeyField,
    record::Namespace,
    testing::record,
  };

  #[test]
  fn cleanup_payload_shape() {
    let result = CleanupResult {
      deleted_count: 1,
      deleted_by_national_id: 1,
      records: vec![RemovedRecord {
        id:            "e2".into(),
        reason:        RemovalReason::NationalIdDuplicate,
        name:          Some("Ana".into()),
        national_id:   Some("12345678".into()),
        email:         None,
        survivor_id:   "e1".into(),
        name_conflict: false,
      }],
      ..Default::default()
    };

    let value = serde_json::to_value(cleanup_response(&result)).unwrap();
    assert_eq!(value["deleted"], json!(1));
    assert_eq!(value["details"]["deletedByDni"], json!(1));
    assert_eq!(value["details"]["deletedByEmail"], json!(0));
    assert_eq!(value["details"]["records"][0], json!({
      "reason": "nationalId-duplicate",
      "name": "Ana",
      "dni": "12345678",
      "email": null,
      "id": "e2",
      "kept": "e1",
      "nameConflict": false,
    }));
    assert_eq!(
      value["message"],
      json!("Removed 1 duplicate employee record(s) (1 by DNI, 0 by email)")
    );
  }

  #[test]
  fn empty_cleanup_message() {
    let response = cleanup_response(&CleanupResult::default());
    assert_eq!(response.deleted, 0);
    assert_eq!(response.message, "No duplicate employee records to remove");
  }

  #[test]
  fn maintenance_payload_shape() {
    let snapshot = Snapshot {
      access: vec![
        record(Namespace::AccessIdentity, "u1", 1, json!({ "email": "A@x.io", "name": "Ana" })),
        record(Namespace::AccessIdentity, "u2", 1, json!({ "email": "b@x.io" })),
      ],
      labor:  vec![
        record(Namespace::LaborProfile, "e1", 2, json!({ "email": "a@x.io", "name": "Ana" })),
      ],
    };
    let all = snapshot.scoped(crate::fetch::Scope::Both);
    let email_groups = find_duplicates(&all, KeyField::Email);
    let dni_groups = find_duplicates(&all, KeyField::NationalId);

    let value =
      serde_json::to_value(maintenance_report(&snapshot, &email_groups, &dni_groups)).unwrap();
    assert_eq!(value, json!({
      "usersCount": 2,
      "employeesCount": 1,
      "uniqueEmails": 2,
      "duplicates": [{
        "email": "a@x.io",
        "records": [
          { "id": "u1", "source": "users", "name": "Ana", "hasWarning": false },
          { "id": "e1", "source": "employees", "name": "Ana", "hasWarning": false },
        ],
      }],
      "dniDuplicates": [],
    }));
  }

  #[test]
  fn user_and_own_labor_profile_are_not_reported_as_duplicates() {
    let snapshot = Snapshot {
      access: vec![record(Namespace::AccessIdentity, "u1", 1, json!({ "email": "a@x.io" }))],
      labor:  vec![record(Namespace::LaborProfile, "u1", 2, json!({ "email": "a@x.io" }))],
    };
    let all = snapshot.scoped(crate::fetch::Scope::Both);
    let report = maintenance_report(
      &snapshot,
      &find_duplicates(&all, KeyField::Email),
      &find_duplicates(&all, KeyField::NationalId),
    );
    assert_eq!(report.unique_emails, 1);
    assert!(report.duplicates.is_empty());
  }
}
