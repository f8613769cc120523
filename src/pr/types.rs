use serde::Deserialize;
use serde_json::Value;

/// A pull request as listed by the GitHub API.
///
/// Only `number`, `head.sha` and `base.sha` are interpreted. The complete
/// object is kept in `raw` so it can be written out untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    /// PR number (e.g., 42)
    pub number: u64,
    /// Tip of the source branch
    pub head: GitRef,
    /// Tip of the target branch
    pub base: GitRef,
    /// The object exactly as the API returned it
    pub raw: Value,
}

/// A branch reference inside a pull request object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitRef {
    pub sha: String,
}

/// The fields we read out of each pull request object.
#[derive(Deserialize)]
struct PullFields {
    number: u64,
    head: GitRef,
    base: GitRef,
}

impl PullRequest {
    /// Build a PullRequest from one element of the API's JSON array,
    /// keeping the original object alongside the extracted fields.
    pub fn from_raw(raw: Value) -> Result<Self, serde_json::Error> {
        let fields = PullFields::deserialize(&raw)?;
        Ok(PullRequest {
            number: fields.number,
            head: fields.head,
            base: fields.base,
            raw,
        })
    }
}

/// Where the pull requests live: API domain plus repository owner and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoordinates {
    /// API root with scheme and without a trailing slash (e.g., https://api.github.com)
    pub domain: String,
    pub owner: String,
    pub repo: String,
}

impl RepoCoordinates {
    pub fn new(domain: &str, owner: &str, repo: &str) -> Self {
        RepoCoordinates {
            domain: domain.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    /// Endpoint for listing pull requests, without query parameters.
    pub fn pulls_url(&self) -> String {
        format!("{}/repos/{}/{}/pulls", self.domain, self.owner, self.repo)
    }
}
