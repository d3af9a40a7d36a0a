//! JSON maintenance API for Roster.
//!
//! Exposes an axum [`Router`] backed by any
//! [`roster_core::store::PersonnelStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roster_api::api_router(store.clone(), ApiSettings::default()))
//! ```

pub mod cleanup;
pub mod duplicates;
pub mod error;
pub mod maintenance;
pub mod unified;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post},
};
use roster_core::{
  cleanup::CleanupOptions,
  fetch::{DEFAULT_TIMEOUT, Fetcher},
  store::PersonnelStore,
};

pub use error::ApiError;

/// Per-deployment knobs for the maintenance workflows.
#[derive(Debug, Clone, Copy)]
pub struct ApiSettings {
  /// Applied to every individual store call.
  pub store_timeout: Duration,
  pub cleanup:       CleanupOptions,
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self { store_timeout: DEFAULT_TIMEOUT, cleanup: CleanupOptions::default() }
  }
}

/// State shared by every handler.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub settings: ApiSettings,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), settings: self.settings }
  }
}

impl<S: PersonnelStore> ApiState<S> {
  /// A fetcher over this request's store handle.
  pub fn fetcher(&self) -> Fetcher<'_, S> {
    Fetcher::new(&self.store, self.settings.store_timeout)
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, settings: ApiSettings) -> Router<()>
where
  S: PersonnelStore + 'static,
{
  Router::new()
    .route("/cleanup-duplicates", post(cleanup::handler::<S>))
    .route("/maintenance-deep", get(maintenance::handler::<S>))
    .route("/unified", get(unified::handler::<S>))
    .route("/duplicates", get(duplicates::handler::<S>))
    .with_state(ApiState { store, settings })
}
