//! Handler for `GET /unified`: the read-only unification dump.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/unified` | Array of unified people, access-backed first |
//! | `GET`  | `/unified?crossCheck=true` | `{people, conflicts}`; see [`key_disagreements`] |

use axum::{
  Json,
  extract::{Query, State},
  response::{IntoResponse, Response},
};
use roster_core::{
  reconcile::{key_disagreements, unify},
  report::CrossCheckedDump,
  store::PersonnelStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedParams {
  /// Also report id-joined pairs whose email or national ID disagree.
  #[serde(default)]
  pub cross_check: bool,
}

/// `GET /unified[?crossCheck=true]`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<UnifiedParams>,
) -> Result<Response, ApiError>
where
  S: PersonnelStore,
{
  let snapshot = state.fetcher().snapshot().await?;
  let people = unify(&snapshot.access, &snapshot.labor);

  if !params.cross_check {
    return Ok(Json(people).into_response());
  }

  let conflicts = key_disagreements(&snapshot.access, &snapshot.labor);
  Ok(Json(CrossCheckedDump { people, conflicts }).into_response())
}
