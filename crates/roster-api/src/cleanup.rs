//! Handler for `POST /cleanup-duplicates`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/cleanup-duplicates` | Optional `?dryRun=true` |

use axum::{
  Json,
  extract::{Query, State},
};
use roster_core::{
  cleanup::CleanupExecutor,
  report::{CleanupResponse, cleanup_response},
  store::PersonnelStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupParams {
  /// Overrides the configured dry-run setting for this request.
  pub dry_run: Option<bool>,
}

/// `POST /cleanup-duplicates[?dryRun=true]`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<CleanupParams>,
) -> Result<Json<CleanupResponse>, ApiError>
where
  S: PersonnelStore,
{
  let mut options = state.settings.cleanup;
  if let Some(dry_run) = params.dry_run {
    options.dry_run = dry_run;
  }

  let result = CleanupExecutor::new(state.fetcher(), options).run().await?;
  Ok(Json(cleanup_response(&result)))
}
