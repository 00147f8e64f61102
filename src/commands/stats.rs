use super::Host;
use super::common::{ColorMode, LogLevel, init_logging};
use super::config::Config;
use crate::Result;
use crate::data::DateWindow;
use crate::github::{DEFAULT_ENDPOINT, GitHubClient};
use crate::reconcile::reconcile;
use crate::reports::{Scorecard, generate_console, generate_json};
use crate::strategy::{InMemory, QueryComposition};
use camino::Utf8PathBuf;
use clap::Parser;
use ohno::{IntoAppError, app_err};
use std::fs;
use std::io::Write;

const LOG_TARGET: &str = "     stats";

#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// First day of the window, inclusive (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start: String,

    /// Last day of the window, inclusive (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end: String,

    /// Path to configuration file (default is `scorecard.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub GraphQL endpoint
    #[arg(long, value_name = "URL", default_value = DEFAULT_ENDPOINT)]
    pub github_api_url: String,

    /// Also write the scorecard to a JSON file
    #[arg(long, value_name = "PATH")]
    pub json: Option<Utf8PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,

    /// Exit with status code 1 if the two strategies disagree on any metric
    #[arg(long)]
    pub error_if_inconsistent: bool,
}

pub async fn compute_scorecard<H: Host>(host: &mut H, args: &StatsArgs) -> Result<()> {
    init_logging(args.log_level);

    let window = DateWindow::parse(&args.start, &args.end)?;
    let config = Config::load(args.config.as_ref())?;
    let token = args
        .github_token
        .as_deref()
        .ok_or_else(|| app_err!("a GitHub token is required, pass --github-token or set GITHUB_TOKEN"))?;

    let client = GitHubClient::new(token, &args.github_api_url, config.max_concurrent_requests)?;
    let request = config.stats_request(window);

    log::info!(target: LOG_TARGET, "Stats for {}/{} over {window}", request.org, request.name);
    log::info!(target: LOG_TARGET, "Team members: {}", request.roster.members.join(", "));
    log::info!(target: LOG_TARGET, "Team bots: {}", request.roster.bots.join(", "));

    // one composition instance, so the volume report reuses the counts behind the stats
    let composition = QueryComposition::new(&client, request.max_in_flight);
    let in_memory = InMemory::new(&client);
    let (reconciliation, volume, assignable_users) = tokio::try_join!(
        reconcile(&in_memory, &composition, &request),
        composition.volume_report(&request),
        client.assignable_users(&request.org, &request.name),
    )?;

    log::info!(target: LOG_TARGET, "Assignable users: {}", assignable_users.join(", "));

    let consistent = reconciliation.is_consistent();
    let scorecard = Scorecard {
        repository: format!("{}/{}", request.org, request.name),
        window,
        stats: reconciliation.stats,
        inconsistencies: reconciliation.inconsistencies,
        volume,
        assignable_users,
    };

    let mut console_output = String::new();
    generate_console(&scorecard, args.color.use_colors(), &mut console_output)?;
    let _ = write!(host.output(), "{console_output}");

    if let Some(filename) = &args.json {
        let mut json_output = String::new();
        generate_json(&scorecard, &mut json_output)?;
        fs::write(filename, json_output).into_app_err_with(|| format!("writing JSON report to '{filename}'"))?;
    }

    if args.error_if_inconsistent && !consistent {
        return Err(app_err!(
            "the two strategies disagree on {} metric(s)",
            scorecard.inconsistencies.len()
        ));
    }

    Ok(())
}
