pub mod types;

pub use types::{ContentResponse, RepoLocation};

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

const GITHUB_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "deploy-gate";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("flag file not found: {0}")]
    NotFound(String),

    #[error("GitHub API returned HTTP {0}")]
    Remote(u16),

    #[error("request to GitHub API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode flag file content: {0}")]
    Decode(String),

    #[error("failed to read local flag file: {0}")]
    LocalRead(#[from] std::io::Error),
}

/// Where the flag file lives. The poll loop only sees this trait, so the
/// classification and loop logic test against scripted sources instead of
/// the network.
#[async_trait]
pub trait FlagSource: Send + Sync {
    /// Short human-readable description of the source, for status lines.
    fn describe(&self) -> String;

    /// Retrieve the flag file's current text, trimmed of surrounding
    /// whitespace. One call per poll attempt; no internal retry.
    async fn fetch(&self) -> Result<String, FetchError>;
}

/// Fetches the flag file from a GitHub repository through the contents API.
/// Anonymous access only; the repository must be publicly readable.
pub struct GitHubSource {
    location: RepoLocation,
    client: reqwest::Client,
    base_url: String,
}

impl GitHubSource {
    pub fn new(location: RepoLocation) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            location,
            client,
            base_url: GITHUB_API_BASE.to_string(),
        })
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.base_url,
            self.location.owner,
            self.location.repo,
            self.location.file_path,
            self.location.branch
        )
    }
}

#[async_trait]
impl FlagSource for GitHubSource {
    fn describe(&self) -> String {
        format!(
            "{}/{} (branch: {})",
            self.location.owner, self.location.repo, self.location.branch
        )
    }

    #[instrument(skip(self), fields(
        repo = %self.location.repo,
        path = %self.location.file_path,
        branch = %self.location.branch
    ))]
    async fn fetch(&self) -> Result<String, FetchError> {
        let url = self.contents_url();
        debug!(%url, "fetching flag file from GitHub contents API");

        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(format!(
                "{} (branch {})",
                self.location.file_path, self.location.branch
            )));
        }
        if !status.is_success() {
            return Err(FetchError::Remote(status.as_u16()));
        }

        let payload = response.json::<ContentResponse>().await?;
        debug!(encoding = %payload.encoding, size = payload.size, "received contents payload");

        payload.decode_text()
    }
}

/// Reads the flag file straight from the local filesystem. Used when the
/// gate runs in the same checkout the reviewer edits.
pub struct LocalSource {
    path: PathBuf,
}

impl LocalSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FlagSource for LocalSource {
    fn describe(&self) -> String {
        format!("local file {}", self.path.display())
    }

    async fn fetch(&self) -> Result<String, FetchError> {
        if !self.path.exists() {
            return Err(FetchError::NotFound(self.path.display().to_string()));
        }
        let text = tokio::fs::read_to_string(&self.path).await?;
        Ok(text.trim().to_string())
    }
}
