pub mod finder;
pub mod types;

pub use finder::PullRequestFinder;
pub use types::{PullRequest, RepoCoordinates};

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Media type of the stable v3 REST API.
const ACCEPT_V3_JSON: &str = "application/vnd.github.v3+json";

#[derive(Debug, Error)]
pub enum PrError {
    #[error("GitHub API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode pull requests on page {page}")]
    Decode {
        page: u32,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "We couldn't find the pull request that matches the local HEAD SHA.\n\
         Domain: {domain}\nOwner: {owner}\nRepo: {repo}\nLocal HEAD SHA: {sha}"
    )]
    NotFound {
        domain: String,
        owner: String,
        repo: String,
        sha: String,
    },
}

/// Source of pull request pages.
///
/// The HTTP client implements this for real runs; tests plug in fakes.
#[async_trait]
pub trait PullsApi: Send + Sync {
    /// Repository the pages are listed from, used for diagnostics.
    fn coordinates(&self) -> &RepoCoordinates;

    /// Fetch one page of pull requests (1-based `page`).
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<Vec<PullRequest>, PrError>;
}

/// `PullsApi` over the GitHub REST API using reqwest.
pub struct HttpPullsApi {
    client: reqwest::Client,
    coordinates: RepoCoordinates,
    token: String,
}

impl HttpPullsApi {
    pub fn new(
        coordinates: RepoCoordinates,
        token: String,
        timeout: Duration,
    ) -> Result<Self, PrError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pr-checker/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(HttpPullsApi {
            client,
            coordinates,
            token,
        })
    }
}

#[async_trait]
impl PullsApi for HttpPullsApi {
    fn coordinates(&self) -> &RepoCoordinates {
        &self.coordinates
    }

    #[instrument(skip(self))]
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<Vec<PullRequest>, PrError> {
        debug!(owner = %self.coordinates.owner, repo = %self.coordinates.repo, "requesting pull request page");
        let body = self
            .client
            .get(self.coordinates.pulls_url())
            .query(&[("per_page", per_page), ("page", page)])
            .header("Accept", ACCEPT_V3_JSON)
            .header("Authorization", format!("token {}", self.token))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!(body_bytes = body.len(), "received pull request page");

        decode_page(&body, page)
    }
}

/// Parse a page body: a JSON array of pull request objects.
fn decode_page(body: &str, page: u32) -> Result<Vec<PullRequest>, PrError> {
    let items: Vec<Value> =
        serde_json::from_str(body).map_err(|source| PrError::Decode { page, source })?;
    items
        .into_iter()
        .map(|item| PullRequest::from_raw(item).map_err(|source| PrError::Decode { page, source }))
        .collect()
}
