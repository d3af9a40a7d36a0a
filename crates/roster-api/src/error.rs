//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. Malformed query strings are
/// rejected by axum's extractors before a handler runs.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] roster_core::Error),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Core(roster_core::Error::Configuration(_)) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
      ApiError::Core(roster_core::Error::Connection { .. }) => {
        StatusCode::SERVICE_UNAVAILABLE
      }
    };
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
