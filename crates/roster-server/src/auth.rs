//! HTTP Basic auth in front of the maintenance API.
//!
//! A single operator account is configured; its password is stored only as
//! an argon2 PHC string.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

use crate::error::Error;

/// The operator account accepted by this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

impl AuthConfig {
  /// True when `username`/`password` match the configured account. An
  /// unparseable stored hash never matches.
  pub fn accepts(&self, username: &str, password: &str) -> bool {
    if username != self.username {
      return false;
    }
    PasswordHash::new(&self.password_hash).is_ok_and(|hash| {
      Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
    })
  }
}

/// Decode `Authorization: Basic …` into a `(username, password)` pair.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let encoded = value.strip_prefix("Basic ")?;
  let decoded = String::from_utf8(B64.decode(encoded.trim()).ok()?).ok()?;
  let (user, pass) = decoded.split_once(':')?;
  Some((user.to_owned(), pass.to_owned()))
}

/// Check the request headers against `config`.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Error> {
  match basic_credentials(headers) {
    Some((user, pass)) if config.accepts(&user, &pass) => Ok(()),
    _ => Err(Error::Unauthorized),
  }
}

/// Middleware: 401 unless the request carries the operator's credentials.
pub async fn require_auth(
  State(config): State<Arc<AuthConfig>>,
  req: Request,
  next: Next,
) -> Result<Response, Error> {
  if let Err(e) = verify_auth(req.headers(), &config) {
    tracing::warn!(path = %req.uri().path(), "rejected unauthenticated request");
    return Err(e);
  }
  Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::http::HeaderValue;
  use rand_core::OsRng;

  use super::*;

  fn operator(password: &str) -> AuthConfig {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    AuthConfig { username: "admin".to_string(), password_hash }
  }

  fn with_authorization(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
  }

  fn basic(user: &str, pass: &str) -> HeaderMap {
    with_authorization(&format!("Basic {}", B64.encode(format!("{user}:{pass}"))))
  }

  #[test]
  fn operator_credentials_are_accepted() {
    let cfg = operator("secret");
    assert!(verify_auth(&basic("admin", "secret"), &cfg).is_ok());
  }

  #[test]
  fn password_may_contain_colons() {
    let cfg = operator("a:b:c");
    assert!(verify_auth(&basic("admin", "a:b:c"), &cfg).is_ok());
  }

  #[test]
  fn wrong_password_or_user_is_rejected() {
    let cfg = operator("secret");
    assert!(matches!(verify_auth(&basic("admin", "wrong"), &cfg), Err(Error::Unauthorized)));
    assert!(matches!(verify_auth(&basic("root", "secret"), &cfg), Err(Error::Unauthorized)));
  }

  #[test]
  fn malformed_headers_are_rejected() {
    let cfg = operator("secret");
    assert!(verify_auth(&HeaderMap::new(), &cfg).is_err());
    assert!(verify_auth(&with_authorization("Basic !!!not-base64!!!"), &cfg).is_err());
    assert!(verify_auth(&with_authorization("Bearer abc"), &cfg).is_err());
  }

  #[test]
  fn corrupt_stored_hash_never_matches() {
    let cfg = AuthConfig { username: "admin".into(), password_hash: "plaintext".into() };
    assert!(!cfg.accepts("admin", "plaintext"));
  }
}
