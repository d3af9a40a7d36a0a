//! Handler for `GET /maintenance-deep`: cross-namespace duplicate analysis.
//! Read-only.

use axum::{Json, extract::State};
use roster_core::{
  detect::find_duplicates,
  fetch::Scope,
  normalize::KeyField,
  report::{MaintenanceReport, maintenance_report},
  store::PersonnelStore,
};

use crate::{ApiState, error::ApiError};

/// `GET /maintenance-deep`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<MaintenanceReport>, ApiError>
where
  S: PersonnelStore,
{
  let snapshot = state.fetcher().snapshot().await?;
  let everyone = snapshot.scoped(Scope::Both);

  let email_groups = find_duplicates(&everyone, KeyField::Email);
  let dni_groups = find_duplicates(&everyone, KeyField::NationalId);

  Ok(Json(maintenance_report(&snapshot, &email_groups, &dni_groups)))
}
