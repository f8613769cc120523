use git2::{Commit, Oid, Repository, Sort};
use std::path::Path;
use tracing::{debug, instrument};

use super::types::{CommitAuthor, CommitRecord};
use super::{CommitError, CommitHistory};

/// A local git repository opened with libgit2.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open the repository whose root (or `.git` directory) is `path`.
    #[allow(dead_code)] // The CLI uses discover; open is exact and used by tests
    pub fn open(path: &Path) -> Result<Self, CommitError> {
        let repo = Repository::open(path).map_err(|source| CommitError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(GitRepository { repo })
    }

    /// Open the repository containing `path`, searching parent directories.
    pub fn discover(path: &Path) -> Result<Self, CommitError> {
        let repo = Repository::discover(path).map_err(|source| CommitError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(GitRepository { repo })
    }

    /// Full sha of the commit HEAD points at.
    pub fn head_sha(&self) -> Result<String, CommitError> {
        let commit = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(CommitError::Head)?;
        Ok(commit.id().to_string())
    }

    /// Look up `sha` as a commit, reporting both range ends if it is absent.
    fn find(&self, sha: &str, base: &str, head: &str) -> Result<Oid, CommitError> {
        Oid::from_str(sha)
            .and_then(|oid| self.repo.find_commit(oid))
            .map(|commit| commit.id())
            .map_err(|source| CommitError::MissingCommit {
                base: base.to_string(),
                head: head.to_string(),
                missing: sha.to_string(),
                source,
            })
    }
}

impl CommitHistory for GitRepository {
    #[instrument(skip(self))]
    fn range_commits(&self, base: &str, head: &str) -> Result<Vec<CommitRecord>, CommitError> {
        let base_oid = self.find(base, base, head)?;
        let head_oid = self.find(head, base, head)?;

        let walk_err = |source: git2::Error| CommitError::Walk {
            base: base.to_string(),
            head: head.to_string(),
            source,
        };

        // Same selection and order as `git log base..head`: newest first, but a
        // child always precedes its parents even when timestamps tie or go backwards.
        let mut revwalk = self.repo.revwalk().map_err(walk_err)?;
        revwalk
            .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
            .map_err(walk_err)?;
        revwalk.push(head_oid).map_err(walk_err)?;
        revwalk.hide(base_oid).map_err(walk_err)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = oid
                .and_then(|oid| self.repo.find_commit(oid))
                .map_err(walk_err)?;
            commits.push(to_record(&commit));
        }
        debug!(commits = commits.len(), "walked commit range");
        Ok(commits)
    }
}

fn to_record(commit: &Commit<'_>) -> CommitRecord {
    let author = commit.author();
    CommitRecord {
        sha: commit.id().to_string(),
        author: CommitAuthor {
            name: String::from_utf8_lossy(author.name_bytes()).into_owned(),
            email: String::from_utf8_lossy(author.email_bytes()).into_owned(),
        },
        message: String::from_utf8_lossy(commit.message_raw_bytes()).into_owned(),
    }
}
