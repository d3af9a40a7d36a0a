//! Handler for `GET /duplicates`: raw detector output for one key and scope.

use axum::{
  Json,
  extract::{Query, State},
};
use roster_core::{
  detect::{DuplicateGroup, find_duplicates},
  fetch::Scope,
  normalize::KeyField,
  store::PersonnelStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct DuplicateParams {
  /// `email` or `nationalId`.
  pub key:   KeyField,
  /// `users`, `employees`, or `both` (default).
  #[serde(default)]
  pub scope: Scope,
}

/// `GET /duplicates?key=<email|nationalId>[&scope=<users|employees|both>]`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<DuplicateParams>,
) -> Result<Json<Vec<DuplicateGroup>>, ApiError>
where
  S: PersonnelStore,
{
  let snapshot = state.fetcher().snapshot().await?;
  let records = snapshot.scoped(params.scope);
  Ok(Json(find_duplicates(&records, params.key)))
}
