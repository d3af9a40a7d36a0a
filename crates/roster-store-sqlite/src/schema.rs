//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per document in either namespace. `seq` preserves insertion
-- order, which is the order fetches return.
CREATE TABLE IF NOT EXISTS documents (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    namespace   TEXT NOT NULL,   -- 'users' | 'employees'
    id          TEXT NOT NULL,
    created_at  TEXT NOT NULL,   -- ISO 8601 UTC
    fields_json TEXT NOT NULL,   -- JSON object, id excluded
    UNIQUE (namespace, id)
);

CREATE INDEX IF NOT EXISTS documents_namespace_idx ON documents(namespace, seq);

PRAGMA user_version = 1;
";
