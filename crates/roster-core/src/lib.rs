//! Core types and reconciliation logic for Roster.
//!
//! Roster keeps two independently maintained record namespaces: access
//! identities (users who can log in) and labor profiles (HR records). This
//! crate holds everything needed to view them as one set of people and to
//! find and clean duplicate records.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::PersonnelStore`]; higher layers (`roster-api`,
//! `roster-cli`) drive the workflows through it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod cleanup;
pub mod detect;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod policy;
pub mod reconcile;
pub mod record;
pub mod report;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
