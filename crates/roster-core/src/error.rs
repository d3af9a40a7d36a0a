//! Error types for `roster-core`.
//!
//! Normalization, grouping and resolution never fail. Only the store boundary
//! does, and every failure there is converted into one of these variants
//! before it reaches a caller.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Required connection settings are missing; raised before any store call.
  #[error("configuration error: {0}")]
  Configuration(String),

  /// The store could not be reached, rejected the call, or timed out.
  #[error("connection error during {operation}: {source}")]
  Connection {
    operation: String,
    #[source]
    source:    Box<dyn std::error::Error + Send + Sync>,
  },
}

impl Error {
  pub fn connection(
    operation: impl Into<String>,
    source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
  ) -> Self {
    Self::Connection { operation: operation.into(), source: source.into() }
  }
}

/// A store call that did not complete within the configured timeout.
#[derive(Debug, Error)]
#[error("store call timed out after {0:?}")]
pub struct Timeout(pub Duration);

pub type Result<T, E = Error> = std::result::Result<T, E>;
