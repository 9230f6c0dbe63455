use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::gate::{DecisionPhrases, PollSettings};
use crate::source::RepoLocation;

const DEFAULT_CONFIG_FILE: &str = ".deploy-gate.toml";
const DEFAULT_BRANCH: &str = "main";
const DEFAULT_FLAG_FILE: &str = "status_check.txt";
const DEFAULT_APPROVE_PHRASE: &str = "cd approved";
const DEFAULT_DECLINE_PHRASE: &str = "cd declined";
const DEFAULT_INTERVAL_SECS: u64 = 5;
const DEFAULT_MAX_DURATION_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Repository in 'owner/name' form expected, got '{0}'")]
    InvalidRepository(String),

    #[error(
        "No repository configured. Pass 'owner/name' on the command line, set \
         [repository] in .deploy-gate.toml, or run under GitHub Actions"
    )]
    MissingRepository,
}

/// Top-level configuration loaded from .deploy-gate.toml.
/// All fields are optional — under GitHub Actions the tool works with zero
/// config, picking the repository up from the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Where the flag file lives
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// The phrases that encode approval and decline
    #[serde(default)]
    pub decision: DecisionConfig,

    /// Loop bounds for the polling session
    #[serde(default)]
    pub poll: PollConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryConfig {
    /// Repository owner. Falls back to GITHUB_REPOSITORY_OWNER.
    pub owner: Option<String>,
    /// Repository name. Falls back to the name part of GITHUB_REPOSITORY.
    pub name: Option<String>,
    /// Branch to read from. Falls back to GITHUB_REF_NAME, then "main".
    pub branch: Option<String>,
    /// Path of the flag file within the repository
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionConfig {
    #[serde(default = "default_approve")]
    pub approve: String,
    #[serde(default = "default_decline")]
    pub decline: String,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            approve: default_approve(),
            decline: default_decline(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Seconds between poll attempts
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Optional cap on poll attempts; unbounded when absent
    pub max_attempts: Option<u32>,
    /// Absolute ceiling on the polling session, in seconds
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            max_attempts: None,
            max_duration_secs: default_max_duration(),
        }
    }
}

fn default_approve() -> String {
    DEFAULT_APPROVE_PHRASE.to_string()
}

fn default_decline() -> String {
    DEFAULT_DECLINE_PHRASE.to_string()
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_max_duration() -> u64 {
    DEFAULT_MAX_DURATION_SECS
}

impl Config {
    /// Load configuration once at startup: the given path, or
    /// .deploy-gate.toml in the current directory if it exists, then
    /// overlay the GitHub Actions environment variables.
    pub fn load(path_override: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path_override {
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
        config.overlay_env();
        Ok(config)
    }

    /// Load from a specific path, without the environment overlay.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Fill unset repository fields from the variables GitHub Actions
    /// provides. Read once here, never again mid-loop.
    fn overlay_env(&mut self) {
        if self.repository.owner.is_none() {
            if let Ok(owner) = std::env::var("GITHUB_REPOSITORY_OWNER") {
                self.repository.owner = Some(owner);
            }
        }
        if let Ok(full) = std::env::var("GITHUB_REPOSITORY") {
            if let Some((owner, name)) = split_owner_repo(&full) {
                self.repository.owner.get_or_insert(owner);
                self.repository.name.get_or_insert(name);
            }
        }
        if self.repository.branch.is_none() {
            if let Ok(branch) = std::env::var("GITHUB_REF_NAME") {
                self.repository.branch = Some(branch);
            }
        }
    }

    /// Resolve the immutable flag-file location, with CLI overrides taking
    /// precedence over config and environment.
    pub fn repo_location(
        &self,
        owner_repo: Option<&str>,
        branch: Option<&str>,
        file: Option<&str>,
    ) -> Result<RepoLocation, ConfigError> {
        let (owner, repo) = match owner_repo {
            Some(full) => split_owner_repo(full)
                .ok_or_else(|| ConfigError::InvalidRepository(full.to_string()))?,
            None => {
                let owner = self
                    .repository
                    .owner
                    .clone()
                    .filter(|s| !s.is_empty())
                    .ok_or(ConfigError::MissingRepository)?;
                let name = self
                    .repository
                    .name
                    .clone()
                    .filter(|s| !s.is_empty())
                    .ok_or(ConfigError::MissingRepository)?;
                (owner, name)
            }
        };

        let branch = branch
            .map(str::to_string)
            .or_else(|| self.repository.branch.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

        let file_path = file
            .map(str::to_string)
            .or_else(|| self.repository.file.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_FLAG_FILE.to_string());

        Ok(RepoLocation {
            owner,
            repo,
            branch,
            file_path,
        })
    }

    /// Decision phrases, with CLI overrides taking precedence.
    pub fn phrases(&self, approve: Option<&str>, decline: Option<&str>) -> DecisionPhrases {
        DecisionPhrases::new(
            approve.unwrap_or(&self.decision.approve),
            decline.unwrap_or(&self.decision.decline),
        )
    }

    /// Poll loop bounds, with CLI overrides taking precedence.
    pub fn poll_settings(
        &self,
        interval_secs: Option<u64>,
        max_attempts: Option<u32>,
        max_duration_secs: Option<u64>,
    ) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(interval_secs.unwrap_or(self.poll.interval_secs)),
            max_attempts: max_attempts.or(self.poll.max_attempts),
            max_duration: Duration::from_secs(
                max_duration_secs.unwrap_or(self.poll.max_duration_secs),
            ),
        }
    }
}

/// Split an "owner/name" repository identifier into its parts.
fn split_owner_repo(full: &str) -> Option<(String, String)> {
    let (owner, name) = full.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((owner.to_string(), name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.repository.owner.is_none());
        assert_eq!(config.decision.approve, "cd approved");
        assert_eq!(config.decision.decline, "cd declined");
        assert_eq!(config.poll.interval_secs, 5);
        assert!(config.poll.max_attempts.is_none());
        assert_eq!(config.poll.max_duration_secs, 86400);
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[repository]
owner = "acme"
name = "widgets"
branch = "release"

[decision]
approve = "ci approved"
decline = "ci declined"

[poll]
interval_secs = 10
max_attempts = 30
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.repository.owner.as_deref(), Some("acme"));
        assert_eq!(config.decision.approve, "ci approved");
        assert_eq!(config.poll.interval_secs, 10);
        assert_eq!(config.poll.max_attempts, Some(30));
        // Unset fields keep their defaults
        assert_eq!(config.poll.max_duration_secs, 86400);
    }

    #[test]
    fn test_repo_location_from_config() {
        let config: Config = toml::from_str(
            r#"
[repository]
owner = "acme"
name = "widgets"
"#,
        )
        .unwrap();
        let location = config.repo_location(None, None, None).unwrap();
        assert_eq!(location.owner, "acme");
        assert_eq!(location.repo, "widgets");
        assert_eq!(location.branch, "main");
        assert_eq!(location.file_path, "status_check.txt");
    }

    #[test]
    fn test_repo_location_cli_overrides_config() {
        let config: Config = toml::from_str(
            r#"
[repository]
owner = "acme"
name = "widgets"
branch = "main"
"#,
        )
        .unwrap();
        let location = config
            .repo_location(Some("other/repo"), Some("test"), Some("ci/flag.txt"))
            .unwrap();
        assert_eq!(location.owner, "other");
        assert_eq!(location.repo, "repo");
        assert_eq!(location.branch, "test");
        assert_eq!(location.file_path, "ci/flag.txt");
    }

    #[test]
    fn test_repo_location_missing_repository() {
        let config = Config::default();
        assert!(matches!(
            config.repo_location(None, None, None),
            Err(ConfigError::MissingRepository)
        ));
    }

    #[test]
    fn test_repo_location_invalid_owner_repo_arg() {
        let config = Config::default();
        assert!(matches!(
            config.repo_location(Some("no-slash"), None, None),
            Err(ConfigError::InvalidRepository(_))
        ));
    }

    #[test]
    fn test_split_owner_repo() {
        assert_eq!(
            split_owner_repo("acme/widgets"),
            Some(("acme".to_string(), "widgets".to_string()))
        );
        assert_eq!(split_owner_repo("acme"), None);
        assert_eq!(split_owner_repo("acme/"), None);
        assert_eq!(split_owner_repo("/widgets"), None);
        assert_eq!(split_owner_repo("a/b/c"), None);
    }

    #[test]
    fn test_poll_settings_overrides() {
        let config = Config::default();
        let settings = config.poll_settings(Some(2), Some(7), None);
        assert_eq!(settings.interval, Duration::from_secs(2));
        assert_eq!(settings.max_attempts, Some(7));
        assert_eq!(settings.max_duration, Duration::from_secs(86400));
    }

    #[test]
    fn test_phrases_overrides() {
        let config = Config::default();
        let phrases = config.phrases(Some("CI Approved"), None);
        assert_eq!(phrases.approve(), "ci approved");
        assert_eq!(phrases.decline(), "cd declined");
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("deploy_gate_test_config.toml");
        std::fs::write(
            &path,
            "[repository]\nowner = \"acme\"\nname = \"widgets\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.repository.owner.as_deref(), Some("acme"));
        assert_eq!(config.repository.name.as_deref(), Some("widgets"));

        std::fs::remove_file(&path).ok();
    }
}
