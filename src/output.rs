use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::commits::CommitRecord;
use crate::pr::PullRequest;

pub const RAW_PR_FILE: &str = "pr.json";
pub const COMMIT_LIST_FILE: &str = "commit-list.json";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Write the pull request object, exactly as the API returned it, to `dir/pr.json`.
#[instrument(skip(pr), fields(pr = pr.number))]
pub fn write_raw_pr(dir: &Path, pr: &PullRequest) -> Result<PathBuf, OutputError> {
    write_json(&dir.join(RAW_PR_FILE), &pr.raw)
}

/// Read back `dir/pr.json` written by a previous run.
#[instrument]
pub fn read_raw_pr(dir: &Path) -> Result<PullRequest, OutputError> {
    let path = dir.join(RAW_PR_FILE);
    let contents = fs::read_to_string(&path).map_err(|source| OutputError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&contents)
        .and_then(PullRequest::from_raw)
        .map_err(|source| OutputError::Json { path, source })
}

/// Write the commits to `dir/commit-list.json`, preserving their order.
#[instrument(skip(commits), fields(commits = commits.len()))]
pub fn write_commit_list(dir: &Path, commits: &[CommitRecord]) -> Result<PathBuf, OutputError> {
    write_json(&dir.join(COMMIT_LIST_FILE), &commits)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<PathBuf, OutputError> {
    let io_err = |source: std::io::Error| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(io_err)?;
    debug!(path = %path.display(), "wrote artifact");
    Ok(path.to_path_buf())
}

/// Print a short summary of what was written to the terminal.
pub fn print_summary(pr: &PullRequest, commits: Option<&[CommitRecord]>, dir: &Path) {
    println!(
        "{} {}",
        format!("PR #{}", pr.number).bold(),
        format!("{} <- {}", short(&pr.base.sha), short(&pr.head.sha)).dimmed()
    );
    if let Some(commits) = commits {
        println!("Commits: {}", commits.len().to_string().green());
        for commit in commits {
            let subject = commit.message.lines().next().unwrap_or_default();
            println!("  {} {}", short(&commit.sha).yellow(), subject);
        }
    }
    println!("Output: {}", dir.display());
}

/// First seven characters of a sha, as git abbreviates it.
fn short(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
