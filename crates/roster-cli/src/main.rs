//! `roster`: maintenance scripts for the Roster personnel store.
//!
//! Runs the reconciliation and cleanup workflows directly against the SQLite
//! store and prints their results as JSON on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```
//! roster --store roster.db import employees employees.json
//! roster --store roster.db report
//! roster --store roster.db cleanup --dry-run
//! ```

mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use roster_core::{
  cleanup::{CleanupOptions, NameConflictMode},
  fetch::Scope,
  normalize::KeyField,
  record::Namespace,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "roster", about = "Personnel reconciliation and duplicate cleanup")]
struct Args {
  /// Path to a TOML config file (store_path, store_timeout_ms).
  #[arg(short, long, value_name = "FILE", default_value = "roster.toml")]
  config: PathBuf,

  /// SQLite store to operate on; overrides the config file.
  #[arg(long, value_name = "PATH")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print every person joined across both namespaces by document id.
  Unify {
    /// Also list id-joined pairs whose email or national ID disagree.
    #[arg(long)]
    cross_check: bool,
  },
  /// Print duplicate groups for one key.
  Duplicates {
    #[arg(long, value_enum)]
    key:   KeyArg,
    #[arg(long, value_enum, default_value_t = ScopeArg::Both)]
    scope: ScopeArg,
  },
  /// Print the cross-namespace duplicate report.
  Report,
  /// Remove duplicate employee records.
  Cleanup {
    /// Report what would be removed without deleting anything.
    #[arg(long)]
    dry_run: bool,
    /// Also resolve email duplicates whose names disagree.
    #[arg(long)]
    resolve_email_conflicts: bool,
    /// Survivor rule for each duplicate group.
    #[arg(long, value_enum, default_value_t = PolicyArg::Earliest)]
    policy: PolicyArg,
  },
  /// Load a JSON array of documents into a namespace.
  Import {
    #[arg(value_enum)]
    namespace: NamespaceArg,
    file:      PathBuf,
  },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KeyArg {
  Email,
  NationalId,
}

impl From<KeyArg> for KeyField {
  fn from(k: KeyArg) -> Self {
    match k {
      KeyArg::Email => KeyField::Email,
      KeyArg::NationalId => KeyField::NationalId,
    }
  }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ScopeArg {
  Users,
  Employees,
  Both,
}

impl From<ScopeArg> for Scope {
  fn from(s: ScopeArg) -> Self {
    match s {
      ScopeArg::Users => Scope::Users,
      ScopeArg::Employees => Scope::Employees,
      ScopeArg::Both => Scope::Both,
    }
  }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum PolicyArg {
  /// Keep the oldest record.
  Earliest,
  /// Keep the record with the most fields filled in.
  MostComplete,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum NamespaceArg {
  Users,
  Employees,
}

impl From<NamespaceArg> for Namespace {
  fn from(n: NamespaceArg) -> Self {
    match n {
      NamespaceArg::Users => Namespace::AccessIdentity,
      NamespaceArg::Employees => Namespace::LaborProfile,
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let settings = settings::load(&args.config, args.store.clone())?;
  settings.validate()?;

  let store = roster_store_sqlite::SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("opening store at {}", settings.store_path.display()))?;
  let ctx = commands::Context { store, timeout: settings.timeout() };

  let output = match args.command {
    Command::Unify { cross_check } => commands::unify_people(&ctx, cross_check).await?,
    Command::Duplicates { key, scope } => {
      commands::duplicates(&ctx, key.into(), scope.into()).await?
    }
    Command::Report => commands::report(&ctx).await?,
    Command::Cleanup { dry_run, resolve_email_conflicts, policy } => {
      let options = CleanupOptions {
        email_conflicts: if resolve_email_conflicts {
          NameConflictMode::Resolve
        } else {
          NameConflictMode::Skip
        },
        dry_run,
        ..CleanupOptions::default()
      };
      commands::cleanup(&ctx, options, policy).await?
    }
    Command::Import { namespace, file } => {
      commands::import(&ctx, namespace.into(), &file).await?
    }
  };

  println!("{}", serde_json::to_string_pretty(&output)?);
  Ok(())
}
