use crate::Result;
use crate::data::{DateWindow, LabelTaxonomy, Roster};
use crate::strategy::StatsRequest;
use camino::{Utf8Path, Utf8PathBuf};
use ohno::{EnrichableExt, IntoAppError, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// File looked up in the current directory when no configuration path is given
pub const DEFAULT_CONFIG_FILE: &str = "scorecard.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The repository and its team
    pub project: ProjectConfig,

    /// Label lists classifying closed issues
    #[serde(default)]
    pub labels: LabelTaxonomy,

    /// Upper bound on concurrent requests
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// GitHub organization
    pub org: String,

    /// GitHub repository name
    pub name: String,

    /// Team member logins
    #[serde(default)]
    pub members: Vec<String>,

    /// Bot account logins
    #[serde(default)]
    pub bots: Vec<String>,
}

const fn default_max_concurrent_requests() -> usize {
    crate::strategy::DEFAULT_MAX_IN_FLIGHT
}

impl Config {
    /// Load configuration from a file, or fall back to the defaults
    ///
    /// Without an explicit path, `scorecard.toml` in the current directory is used if present.
    pub fn load(config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = Utf8PathBuf::from(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::default_config(),
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        Self::parse(&text).map_err(|e| e.enrich_with(|| format!("loading configuration file '{final_path}'")))
    }

    /// The configuration embedded from `default_config.toml`
    pub fn default_config() -> Result<Self> {
        Self::parse(DEFAULT_CONFIG_TOML)
    }

    /// Write the default configuration to a TOML file
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to '{output_path}'"))?;
        Ok(())
    }

    fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).into_app_err("parsing configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.project.org.trim().is_empty() {
            bail!("project.org must not be empty");
        }

        if self.project.name.trim().is_empty() {
            bail!("project.name must not be empty");
        }

        if self.max_concurrent_requests == 0 {
            bail!("max_concurrent_requests must be at least 1");
        }

        if let Some(label) = self.labels.all().find(|label| label.contains('"')) {
            bail!("label '{label}' must not contain a double quote");
        }

        Ok(())
    }

    #[must_use]
    pub fn roster(&self) -> Roster {
        Roster {
            members: self.project.members.clone(),
            bots: self.project.bots.clone(),
        }
    }

    /// Builds the request for one run over `window`
    #[must_use]
    pub fn stats_request(&self, window: DateWindow) -> StatsRequest {
        StatsRequest::new(&self.project.org, &self.project.name, window, self.roster(), self.labels.clone())
            .with_max_in_flight(self.max_concurrent_requests)
    }
}
