//! Command-line interface for issue-scorecard
//!
//! # Commands
//!
//! - **stats**: Compute the scorecard of a repository over a date window, cross-checking the
//!   query-composition and in-memory strategies, and print it to the console and optionally to JSON
//! - **init**: Write the default configuration file
//! - **validate**: Check that a configuration file loads and is consistent
//!
//! The `run` function parses command-line arguments with clap and routes to the matching
//! handler. All output goes through a [`Host`] so commands can be exercised in tests.
//!
//! Configuration is a TOML file naming the repository, the team roster, the label taxonomy and
//! the request concurrency.

mod common;
mod config;
mod host;
mod init;
mod run;
mod stats;
mod validate;

pub use common::{ColorMode, LogLevel};
pub use config::{Config, DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_TOML, ProjectConfig};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use run::run;
pub use stats::{StatsArgs, compute_scorecard};
pub use validate::{ValidateArgs, validate_config};
