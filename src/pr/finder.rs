use tracing::{debug, info, instrument};

use super::{PrError, PullRequest, PullsApi};

/// Fixed page size; also the largest the API accepts.
pub const PAGE_SIZE: u32 = 100;

/// Finds the pull request whose head matches a given commit.
pub struct PullRequestFinder<A> {
    api: A,
}

/// Lazy sequence of pull request pages.
///
/// Pages are requested one at a time starting from page 1. The sequence ends
/// after the first page holding fewer than `PAGE_SIZE` items, so a full page
/// is always followed by one more request.
pub struct Pages<'a, A> {
    api: &'a A,
    page: u32,
    exhausted: bool,
}

impl<A: PullsApi> Pages<'_, A> {
    /// Fetch the next page, or `None` once the short page has been seen.
    pub async fn next_page(&mut self) -> Result<Option<Vec<PullRequest>>, PrError> {
        if self.exhausted {
            return Ok(None);
        }
        let page = self.page;
        let pulls = self.api.fetch_page(page, PAGE_SIZE).await?;
        debug!(page, items = pulls.len(), "fetched page");

        self.page += 1;
        self.exhausted = is_last_page(pulls.len());
        Ok(Some(pulls))
    }
}

fn is_last_page(len: usize) -> bool {
    len < PAGE_SIZE as usize
}

impl<A: PullsApi> PullRequestFinder<A> {
    pub fn new(api: A) -> Self {
        PullRequestFinder { api }
    }

    pub fn pages(&self) -> Pages<'_, A> {
        Pages {
            api: &self.api,
            page: 1,
            exhausted: false,
        }
    }

    /// Fetch every page and return all pull requests in fetch order.
    #[allow(dead_code)] // The CLI only needs find_by_head_sha
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> Result<Vec<PullRequest>, PrError> {
        let mut pages = self.pages();
        let mut all = Vec::new();
        while let Some(page) = pages.next_page().await? {
            all.extend(page);
        }
        info!(pull_requests = all.len(), "listed pull requests");
        Ok(all)
    }

    /// Return the first pull request (in fetch order) whose head sha equals
    /// `sha` exactly. Stops requesting pages once a match is found.
    #[instrument(skip(self))]
    pub async fn find_by_head_sha(&self, sha: &str) -> Result<PullRequest, PrError> {
        let mut pages = self.pages();
        while let Some(page) = pages.next_page().await? {
            if let Some(found) = page.into_iter().find(|pr| pr.head.sha == sha) {
                info!(number = found.number, "matched pull request");
                return Ok(found);
            }
        }

        let coords = self.api.coordinates();
        Err(PrError::NotFound {
            domain: coords.domain.clone(),
            owner: coords.owner.clone(),
            repo: coords.repo.clone(),
            sha: sha.to_string(),
        })
    }
}
