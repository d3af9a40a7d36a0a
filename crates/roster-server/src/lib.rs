//! HTTP server wiring for Roster.
//!
//! Puts the [`roster_api`] router behind HTTP Basic auth and request tracing
//! and owns the server's configuration shape.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use axum::{Router, middleware};
use roster_api::ApiSettings;
use roster_core::{
  cleanup::{CleanupOptions, NameConflictMode},
  store::PersonnelStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `roster.toml` and
/// `ROSTER_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                       String,
  #[serde(default = "default_port")]
  pub port:                       u16,
  #[serde(default)]
  pub store_path:                 PathBuf,
  #[serde(default = "default_store_timeout_ms")]
  pub store_timeout_ms:           u64,
  #[serde(default)]
  pub auth_username:              String,
  #[serde(default)]
  pub auth_password_hash:         String,
  #[serde(default)]
  pub email_name_conflicts:       NameConflictMode,
  #[serde(default = "default_national_id_name_conflicts")]
  pub national_id_name_conflicts: NameConflictMode,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_timeout_ms() -> u64 { 10_000 }

fn default_national_id_name_conflicts() -> NameConflictMode { NameConflictMode::Resolve }

impl ServerConfig {
  /// Read `path` (optional) layered under `ROSTER_*` environment variables,
  /// validate, and expand a leading `~` in `store_path`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let raw = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("ROSTER"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: ServerConfig = raw
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.validate()?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  /// Reject configurations missing the store location or credentials.
  pub fn validate(&self) -> roster_core::Result<()> {
    let mut missing = Vec::new();
    if self.store_path.as_os_str().is_empty() {
      missing.push("store_path");
    }
    if self.auth_username.trim().is_empty() {
      missing.push("auth_username");
    }
    if self.auth_password_hash.trim().is_empty() {
      missing.push("auth_password_hash");
    }
    if missing.is_empty() {
      Ok(())
    } else {
      Err(roster_core::Error::Configuration(format!(
        "missing required setting(s): {}",
        missing.join(", ")
      )))
    }
  }

  pub fn api_settings(&self) -> ApiSettings {
    ApiSettings {
      store_timeout: Duration::from_millis(self.store_timeout_ms),
      cleanup:       CleanupOptions {
        national_id_conflicts: self.national_id_name_conflicts,
        email_conflicts:       self.email_name_conflicts,
        dry_run:               false,
      },
    }
  }

  pub fn auth_config(&self) -> AuthConfig {
    AuthConfig {
      username:      self.auth_username.clone(),
      password_hash: self.auth_password_hash.clone(),
    }
  }
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), std::env::var_os("HOME")) {
    (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Everything the router is built from.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server's axum [`Router`]: the maintenance API under `/api`,
/// every route authenticated.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: PersonnelStore + 'static,
{
  let api = roster_api::api_router(state.store, state.config.api_settings())
    .layer(middleware::from_fn_with_state(state.auth, auth::require_auth));

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use rand_core::OsRng;
  use roster_core::record::Namespace;
  use roster_store_sqlite::{NewDocument, SqliteStore};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  fn hash(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  fn config(password_hash: String) -> ServerConfig {
    ServerConfig {
      host:                       "127.0.0.1".to_string(),
      port:                       8080,
      store_path:                 PathBuf::from(":memory:"),
      store_timeout_ms:           1_000,
      auth_username:              "admin".to_string(),
      auth_password_hash:         password_hash,
      email_name_conflicts:       NameConflictMode::Skip,
      national_id_name_conflicts: NameConflictMode::Resolve,
    }
  }

  async fn make_state(password: &str) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut doc = NewDocument::new(
      json!({ "name": "Eva", "email": "eva@x.io" }).as_object().cloned().unwrap(),
    );
    doc.id = Some("e9".into());
    store.insert(Namespace::LaborProfile, doc).await.unwrap();

    let config = config(hash(password));
    AppState {
      store:  Arc::new(store),
      auth:   Arc::new(config.auth_config()),
      config: Arc::new(config),
    }
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn send(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    auth: Option<&str>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
      builder = builder.header(header::AUTHORIZATION, auth);
    }
    router(state)
      .oneshot(builder.body(Body::empty()).unwrap())
      .await
      .unwrap()
  }

  #[tokio::test]
  async fn unauthenticated_requests_return_401() {
    let state = make_state("secret").await;
    let resp = send(state, "GET", "/api/unified", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn wrong_password_returns_401() {
    let state = make_state("secret").await;
    let auth = auth_header("admin", "nope");
    let resp = send(state, "POST", "/api/cleanup-duplicates", Some(&auth)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn authenticated_unified_dump() {
    let state = make_state("secret").await;
    let auth = auth_header("admin", "secret");
    let resp = send(state, "GET", "/api/unified", Some(&auth)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!([{
      "id": "e9",
      "hasAccess": false,
      "hasLaborProfile": true,
      "name": "Eva",
      "email": "eva@x.io",
    }]));
  }

  #[tokio::test]
  async fn unknown_route_is_404() {
    let state = make_state("secret").await;
    let auth = auth_header("admin", "secret");
    let resp = send(state, "GET", "/api/nope", Some(&auth)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn validate_reports_every_missing_setting() {
    let mut cfg = config(String::new());
    cfg.store_path = PathBuf::new();
    cfg.auth_username = " ".to_string();

    let err = cfg.validate().unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, roster_core::Error::Configuration(_)));
    assert!(msg.contains("store_path"), "{msg}");
    assert!(msg.contains("auth_username"), "{msg}");
    assert!(msg.contains("auth_password_hash"), "{msg}");
  }

  #[test]
  fn tilde_expands_to_home() {
    let Some(home) = std::env::var_os("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/roster.db")),
      PathBuf::from(home).join("roster.db")
    );
    assert_eq!(expand_tilde(Path::new("/var/roster.db")), PathBuf::from("/var/roster.db"));
  }

  #[test]
  fn api_settings_follow_config() {
    let mut cfg = config("x".to_string());
    cfg.email_name_conflicts = NameConflictMode::Resolve;
    let settings = cfg.api_settings();
    assert_eq!(settings.store_timeout, Duration::from_secs(1));
    assert_eq!(settings.cleanup.email_conflicts, NameConflictMode::Resolve);
    assert!(!settings.cleanup.dry_run);
  }
}
