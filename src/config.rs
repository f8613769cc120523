use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::pr::RepoCoordinates;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = ".pr-checker.toml";
pub const DEFAULT_DOMAIN: &str = "https://api.github.com";
pub const DEFAULT_OUTPUT_DIR: &str = "build/github-pr";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting `{0}` (set it in .pr-checker.toml or pass it on the command line)")]
    MissingField(&'static str),
}

/// Top-level configuration loaded from .pr-checker.toml.
///
/// Every field is optional in the file; command-line flags fill the gaps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// GitHub-specific settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Where the artifacts are written
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// API root with scheme, e.g. https://api.github.com or a GitHub Enterprise URL.
    pub domain: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
    /// HTTP request timeout in seconds
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    pub dir: Option<PathBuf>,
}

/// Values given on the command line. `Some` wins over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub domain: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `path`, or from .pr-checker.toml in the
    /// current directory when no path is given.
    /// A missing default file yields the default config; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load_from(default)?
                } else {
                    Config::default()
                }
            }
        };

        if config.github.token.is_none() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                config.github.token = Some(token);
            }
        }

        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply command-line values on top of the file values.
    pub fn with_overrides(mut self, overrides: Overrides) -> Config {
        let github = &mut self.github;
        github.domain = overrides.domain.or(github.domain.take());
        github.owner = overrides.owner.or(github.owner.take());
        github.repo = overrides.repo.or(github.repo.take());
        github.token = overrides.token.or(github.token.take());
        github.timeout_secs = overrides.timeout_secs.or(github.timeout_secs);
        self.output.dir = overrides.output_dir.or(self.output.dir.take());
        self
    }

    /// Domain, owner and repo of the pull requests. Domain defaults to the
    /// public GitHub API.
    pub fn coordinates(&self) -> Result<RepoCoordinates, ConfigError> {
        let domain = self.github.domain.as_deref().unwrap_or(DEFAULT_DOMAIN);
        let owner = self
            .github
            .owner
            .as_deref()
            .ok_or(ConfigError::MissingField("owner"))?;
        let repo = self
            .github
            .repo
            .as_deref()
            .ok_or(ConfigError::MissingField("repo"))?;
        Ok(RepoCoordinates::new(domain, owner, repo))
    }

    pub fn token(&self) -> Result<String, ConfigError> {
        self.github
            .token
            .clone()
            .ok_or(ConfigError::MissingField("token"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.github.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }
}
