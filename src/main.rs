mod commits;
mod config;
mod output;
mod pr;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use commits::{CommitRangeExtractor, CommitRecord, GitRepository};
use pr::{HttpPullsApi, PullRequest, PullRequestFinder};

/// PR Checker: finds the GitHub Pull Request whose head is the local HEAD
/// and writes its raw JSON (pr.json) and its commits (commit-list.json).
#[derive(Parser, Debug)]
#[command(name = "pr-checker", version, about)]
struct Cli {
    /// Config file (defaults to .pr-checker.toml in the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API root with scheme, e.g. https://api.github.com
    #[arg(long, global = true)]
    domain: Option<String>,

    /// Repository owner
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Repository name
    #[arg(long, global = true)]
    repo: Option<String>,

    /// GitHub API token (falls back to GITHUB_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Directory for pr.json and commit-list.json
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Path inside the local git checkout
    #[arg(long, global = true, default_value = ".")]
    repo_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Find the PR matching local HEAD and write pr.json
    RawPr,
    /// Read pr.json and write the PR's commits to commit-list.json
    CommitList,
    /// Both steps in order (default)
    Run,
}

impl Cli {
    fn overrides(&self) -> config::Overrides {
        config::Overrides {
            domain: self.domain.clone(),
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            token: self.token.clone(),
            timeout_secs: self.timeout_secs,
            output_dir: self.output_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?.with_overrides(cli.overrides());
    let output_dir = config.output_dir();
    debug!(output_dir = %output_dir.display(), repo_dir = %cli.repo_dir.display(), "resolved paths");

    match cli.command.unwrap_or(Command::Run) {
        Command::RawPr => {
            let pull_request = generate_raw_pr(&config, &cli.repo_dir, &output_dir).await?;
            output::print_summary(&pull_request, None, &output_dir);
        }
        Command::CommitList => {
            let pull_request = output::read_raw_pr(&output_dir)?;
            let commits = generate_commit_list(&pull_request, &cli.repo_dir, &output_dir)?;
            output::print_summary(&pull_request, Some(commits.as_slice()), &output_dir);
        }
        Command::Run => {
            let pull_request = generate_raw_pr(&config, &cli.repo_dir, &output_dir).await?;
            let commits = generate_commit_list(&pull_request, &cli.repo_dir, &output_dir)?;
            output::print_summary(&pull_request, Some(commits.as_slice()), &output_dir);
        }
    }

    info!("done");
    Ok(())
}

/// Find the pull request whose head is the local HEAD and write pr.json.
async fn generate_raw_pr(
    config: &config::Config,
    repo_dir: &Path,
    output_dir: &Path,
) -> Result<PullRequest, Box<dyn std::error::Error>> {
    let head_sha = GitRepository::discover(repo_dir)?.head_sha()?;
    info!(head_sha = %head_sha, "resolved local HEAD");

    let coordinates = config.coordinates()?;
    debug!(domain = %coordinates.domain, owner = %coordinates.owner, repo = %coordinates.repo, "listing pull requests");
    let api = HttpPullsApi::new(coordinates, config.token()?, config.timeout())?;

    let pull_request = PullRequestFinder::new(api).find_by_head_sha(&head_sha).await?;
    let path = output::write_raw_pr(output_dir, &pull_request)?;
    info!(pr = pull_request.number, path = %path.display(), "wrote raw pull request");
    Ok(pull_request)
}

/// Resolve the pull request's commits in the local repository and write commit-list.json.
fn generate_commit_list(
    pull_request: &PullRequest,
    repo_dir: &Path,
    output_dir: &Path,
) -> Result<Vec<CommitRecord>, Box<dyn std::error::Error>> {
    let extractor = CommitRangeExtractor::new(GitRepository::discover(repo_dir)?);
    let commits = extractor.commits_in(pull_request)?;
    let path = output::write_commit_list(output_dir, &commits)?;
    info!(commits = commits.len(), path = %path.display(), "wrote commit list");
    Ok(commits)
}
