//! issue-scorecard crate
//!
//! Computes issue-tracker health metrics for a GitHub repository over a date window. Every metric
//! is computed twice, once by composing many narrow server-side count queries and once by
//! fetching the matching issues and filtering them locally. The two results are reconciled and
//! any disagreement is reported alongside the canonical numbers.
//!
//! # Module Organization
//!
//! - [`query`]: Immutable search predicates and their serialization to GitHub search syntax
//! - [`data`]: Issues, date windows, rosters, label taxonomies, and the metric record
//! - [`port`]: The count/fetch boundary the strategies depend on, plus an in-memory mock
//! - [`strategy`]: The query-composition and in-memory strategies
//! - [`reconcile`]: Runs both strategies and diffs their results
//! - [`github`]: GitHub GraphQL implementation of the port
//! - [`reports`]: Console and JSON rendering of a run
//! - [`commands`]: Command-line interface

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub mod commands;
pub mod data;
pub mod github;
pub mod port;
pub mod query;
pub mod reconcile;
pub mod reports;
pub mod strategy;
mod throttler;

#[cfg(test)]
mod test_utils;

pub use commands::{Host, run};
pub use reconcile::{Reconciliation, compute_stats};
