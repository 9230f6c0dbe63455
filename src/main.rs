mod config;
mod console;
mod gate;
mod source;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use gate::WallClock;
use source::{FlagSource, GitHubSource, LocalSource};

/// deploy-gate — manual approval gate for CI/CD pipelines. Polls a flag
/// file for a human approve/decline decision and maps the outcome to the
/// process exit code (0 approved, 1 otherwise).
#[derive(Parser, Debug)]
#[command(name = "deploy-gate", version, about)]
struct Cli {
    /// Repository in `owner/name` form.
    ///
    /// Not required when --local is used or when the repository comes from
    /// .deploy-gate.toml / the GitHub Actions environment.
    repo: Option<String>,

    /// Branch to read the flag file from
    #[arg(short, long)]
    branch: Option<String>,

    /// Path of the flag file within the repository
    #[arg(short, long)]
    file: Option<String>,

    /// Phrase that approves the deployment (default: "cd approved")
    #[arg(long)]
    approve_phrase: Option<String>,

    /// Phrase that declines the deployment (default: "cd declined")
    #[arg(long)]
    decline_phrase: Option<String>,

    /// Seconds between poll attempts
    #[arg(short, long)]
    interval: Option<u64>,

    /// Maximum number of poll attempts before giving up
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Overall polling ceiling in seconds (default: 24 hours)
    #[arg(long)]
    max_duration: Option<u64>,

    /// Read the flag file from the local filesystem instead of GitHub
    #[arg(long, value_name = "PATH")]
    local: Option<PathBuf>,

    /// Config file path (default: .deploy-gate.toml in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(approved) => {
            console::outcome(approved);
            if approved {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?;

    let phrases = config.phrases(cli.approve_phrase.as_deref(), cli.decline_phrase.as_deref());
    let settings = config.poll_settings(cli.interval, cli.max_attempts, cli.max_duration);
    debug!(
        interval_secs = settings.interval.as_secs(),
        max_attempts = settings.max_attempts,
        max_duration_secs = settings.max_duration.as_secs(),
        "resolved poll settings"
    );

    let flag_source: Box<dyn FlagSource> = match cli.local {
        Some(path) => {
            info!(path = %path.display(), "reading flag file from the local filesystem");
            Box::new(LocalSource::new(path))
        }
        None => {
            let location = config.repo_location(
                cli.repo.as_deref(),
                cli.branch.as_deref(),
                cli.file.as_deref(),
            )?;
            info!(
                owner = %location.owner,
                repo = %location.repo,
                branch = %location.branch,
                file = %location.file_path,
                "resolved repository location"
            );
            Box::new(GitHubSource::new(location)?)
        }
    };

    console::banner(&flag_source.describe(), settings.interval, &phrases);

    let timer = WallClock::start();
    let approved = gate::poll_for_decision(flag_source.as_ref(), &phrases, &settings, &timer).await;
    info!(approved, "polling session finished");
    Ok(approved)
}
