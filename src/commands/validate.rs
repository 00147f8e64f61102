use super::Host;
use super::config::Config;
use crate::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (default is `scorecard.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    let config_path = args.config.as_ref();

    match Config::load(config_path) {
        Ok(config) => {
            let _ = writeln!(host.output(), "Configuration file is valid");
            if let Some(path) = config_path {
                let _ = writeln!(host.output(), "Config file: {path}");
            } else {
                let _ = writeln!(host.output(), "Using the configuration found in the current directory or the defaults");
            }

            let _ = writeln!(host.output(), "Repository: {}/{}", config.project.org, config.project.name);

            let overlap = config.roster().overlap().join(", ");
            if !overlap.is_empty() {
                let _ = writeln!(
                    host.output(),
                    "Warning: logins listed as both members and bots make the two strategies disagree: {overlap}"
                );
            }

            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "Configuration validation failed: {e}");
            host.exit(1);
            Err(e)
        }
    }
}
