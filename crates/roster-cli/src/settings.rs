//! CLI configuration: `roster.toml` layered under `ROSTER_*` variables, with
//! `--store` on top.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
  #[serde(default)]
  pub store_path:       PathBuf,
  #[serde(default = "default_store_timeout_ms")]
  pub store_timeout_ms: u64,
}

fn default_store_timeout_ms() -> u64 { 10_000 }

impl Settings {
  pub fn timeout(&self) -> Duration { Duration::from_millis(self.store_timeout_ms) }

  pub fn validate(&self) -> roster_core::Result<()> {
    if self.store_path.as_os_str().is_empty() {
      return Err(roster_core::Error::Configuration(
        "missing required setting: store_path (or --store)".into(),
      ));
    }
    Ok(())
  }
}

pub fn load(path: &Path, store_override: Option<PathBuf>) -> anyhow::Result<Settings> {
  let raw = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("ROSTER"))
    .build()
    .context("failed to read config file")?;

  let mut settings: Settings = raw
    .try_deserialize()
    .context("failed to deserialise CLI settings")?;
  if let Some(store) = store_override {
    settings.store_path = store;
  }
  Ok(settings)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn store_override_wins() {
    let settings = load(Path::new("does-not-exist.toml"), Some("x.db".into())).unwrap();
    assert_eq!(settings.store_path, PathBuf::from("x.db"));
    assert!(settings.validate().is_ok());
  }

  #[test]
  fn missing_store_is_a_configuration_error() {
    let settings = Settings { store_path: PathBuf::new(), store_timeout_ms: 1 };
    assert!(matches!(
      settings.validate(),
      Err(roster_core::Error::Configuration(_))
    ));
  }
}
