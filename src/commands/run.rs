//! Command dispatch logic for issue-scorecard

use super::{InitArgs, StatsArgs, ValidateArgs, compute_scorecard, init_config, validate_config};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "issue-scorecard", version, author, long_about = None)]
#[command(about = "Compute issue-tracker health metrics for a GitHub repository")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: ScorecardSubcommand,
}

#[derive(Subcommand, Debug)]
enum ScorecardSubcommand {
    /// Compute the scorecard of a repository over a date window
    Stats(Box<StatsArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match Cli::parse_from(args).command {
        ScorecardSubcommand::Stats(stats_args) => compute_scorecard(host, &stats_args).await,
        ScorecardSubcommand::Init(init_args) => init_config(host, &init_args),
        ScorecardSubcommand::Validate(validate_args) => validate_config(host, &validate_args),
    }
}
