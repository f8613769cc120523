pub mod git;
pub mod types;

pub use git::GitRepository;
pub use types::CommitRecord;

use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, instrument};

use crate::pr::PullRequest;

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("Failed to open git repository at {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to get the local HEAD sha")]
    Head(#[source] git2::Error),

    #[error(
        "Failed to get the commits in the pull request: {missing} is not in the local repository.\n\
         BASE SHA: {base}\nHEAD SHA: {head}"
    )]
    MissingCommit {
        base: String,
        head: String,
        missing: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to get the commits in the pull request.\nBASE SHA: {base}\nHEAD SHA: {head}")]
    Walk {
        base: String,
        head: String,
        #[source]
        source: git2::Error,
    },
}

/// Read access to local commit history.
///
/// `GitRepository` implements this over libgit2; tests use in-memory fakes.
pub trait CommitHistory {
    /// Commits reachable from `head` but not from `base`, newest first,
    /// in the same order `git log base..head` prints them.
    fn range_commits(&self, base: &str, head: &str) -> Result<Vec<CommitRecord>, CommitError>;
}

/// Resolves the commits a pull request contributes.
pub struct CommitRangeExtractor<H> {
    history: H,
}

impl<H: CommitHistory> CommitRangeExtractor<H> {
    pub fn new(history: H) -> Self {
        CommitRangeExtractor { history }
    }

    #[instrument(skip(self))]
    pub fn commits_between(&self, base: &str, head: &str) -> Result<Vec<CommitRecord>, CommitError> {
        let commits = self.history.range_commits(base, head)?;
        info!(commits = commits.len(), "resolved commit range");
        Ok(commits)
    }

    /// Commits between the pull request's base and head.
    pub fn commits_in(&self, pr: &PullRequest) -> Result<Vec<CommitRecord>, CommitError> {
        self.commits_between(&pr.base.sha, &pr.head.sha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::types::GitRef;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Linear in-memory history: each entry's parent is the one before it.
    struct FakeHistory {
        commits: Vec<CommitRecord>,
        calls: RefCell<Vec<(String, String)>>,
    }

    impl FakeHistory {
        fn new(commits: Vec<CommitRecord>) -> Self {
            FakeHistory {
                commits,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn missing(base: &str, head: &str, sha: &str) -> CommitError {
            CommitError::MissingCommit {
                base: base.to_string(),
                head: head.to_string(),
                missing: sha.to_string(),
                source: git2::Error::from_str("object not found"),
            }
        }
    }

    impl CommitHistory for FakeHistory {
        fn range_commits(&self, base: &str, head: &str) -> Result<Vec<CommitRecord>, CommitError> {
            self.calls
                .borrow_mut()
                .push((base.to_string(), head.to_string()));
            let index: HashMap<&str, usize> = self
                .commits
                .iter()
                .enumerate()
                .map(|(i, c)| (c.sha.as_str(), i))
                .collect();
            let base_at = *index.get(base).ok_or_else(|| Self::missing(base, head, base))?;
            let head_at = *index.get(head).ok_or_else(|| Self::missing(base, head, head))?;
            if head_at <= base_at {
                return Ok(Vec::new());
            }
            Ok(self.commits[base_at + 1..=head_at].iter().rev().cloned().collect())
        }
    }

    fn linear() -> Vec<CommitRecord> {
        vec![
            CommitRecord::new("aaaaa", "Rin", "levelrin@gmail.com", "initial"),
            CommitRecord::new("12345", "Rin", "levelrin@gmail.com", "commit message"),
            CommitRecord::new("67890", "Ann", "ann@example.com", "second\n\nwith body\n"),
        ]
    }

    #[test]
    fn test_single_commit_range() {
        let extractor = CommitRangeExtractor::new(FakeHistory::new(linear()));
        let commits = extractor.commits_between("aaaaa", "12345").unwrap();
        assert_eq!(
            commits,
            vec![CommitRecord::new("12345", "Rin", "levelrin@gmail.com", "commit message")]
        );
    }

    #[test]
    fn test_range_is_newest_first() {
        let extractor = CommitRangeExtractor::new(FakeHistory::new(linear()));
        let commits = extractor.commits_between("aaaaa", "67890").unwrap();
        let shas: Vec<&str> = commits.iter().map(|c| c.sha.as_str()).collect();
        assert_eq!(shas, vec!["67890", "12345"]);
        assert_eq!(commits[0].message, "second\n\nwith body\n");
    }

    #[test]
    fn test_commits_in_uses_base_and_head() {
        let history = FakeHistory::new(linear());
        let extractor = CommitRangeExtractor::new(history);
        let pr = PullRequest {
            number: 2,
            head: GitRef { sha: "67890".to_string() },
            base: GitRef { sha: "12345".to_string() },
            raw: json!({}),
        };
        let commits = extractor.commits_in(&pr).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(
            extractor.history.calls.borrow().as_slice(),
            &[("12345".to_string(), "67890".to_string())]
        );
    }

    #[test]
    fn test_walk_error_message_leaves_source_to_the_chain() {
        use std::error::Error as _;

        let err = CommitError::Walk {
            base: "aaaaa".to_string(),
            head: "12345".to_string(),
            source: git2::Error::from_str("revwalk exploded"),
        };
        assert!(!err.to_string().contains("revwalk exploded"));
        assert!(err.to_string().contains("BASE SHA: aaaaa"));
        assert!(err.source().unwrap().to_string().contains("revwalk exploded"));
    }

    #[test]
    fn test_missing_sha_is_repository_error() {
        let extractor = CommitRangeExtractor::new(FakeHistory::new(linear()));
        let err = extractor.commits_between("aaaaa", "deadbeef").unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, CommitError::MissingCommit { .. }));
        assert!(msg.contains("BASE SHA: aaaaa"));
        assert!(msg.contains("HEAD SHA: deadbeef"));
    }
}
