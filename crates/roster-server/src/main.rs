//! roster-server binary.
//!
//! Serves the Roster maintenance API (`/api/cleanup-duplicates`,
//! `/api/maintenance-deep`, `/api/unified`, `/api/duplicates`) over HTTP,
//! behind Basic auth, against a SQLite personnel store.
//!
//! # Operator password
//!
//! `auth_password_hash` holds an argon2 PHC string. Produce one with:
//!
//! ```
//! echo -n 'the password' | roster-server --hash-password
//! ```

use std::{io::BufRead, path::PathBuf, sync::Arc};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use roster_server::{AppState, ServerConfig};
use roster_store_sqlite::SqliteStore;
use tokio::{net::TcpListener, signal};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Roster personnel maintenance server")]
struct Cli {
  /// TOML configuration file; `ROSTER_*` environment variables override it.
  #[arg(short, long, default_value = "roster.toml")]
  config: PathBuf,

  /// Read a password from stdin, print its argon2 hash, and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  if cli.hash_password {
    return print_password_hash();
  }

  let config = ServerConfig::load(&cli.config)?;
  let store = SqliteStore::open(&config.store_path)
    .await
    .with_context(|| format!("opening store at {}", config.store_path.display()))?;

  let address = format!("{}:{}", config.host, config.port);
  let app = roster_server::router(AppState {
    store:  Arc::new(store),
    auth:   Arc::new(config.auth_config()),
    config: Arc::new(config),
  });

  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("binding {address}"))?;
  tracing::info!(%address, "roster-server listening");

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("roster-server stopped");
  Ok(())
}

fn print_password_hash() -> anyhow::Result<()> {
  let mut line = String::new();
  std::io::stdin()
    .lock()
    .read_line(&mut line)
    .context("reading password from stdin")?;
  let password = line.trim_end_matches(['\r', '\n']);

  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
  println!("{hash}");
  Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      tracing::error!("failed to install Ctrl+C handler: {e}");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!("failed to install SIGTERM handler: {e}");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
  tracing::info!("shutdown signal received");
}
