use serde::{Deserialize, Serialize};

/// One commit of a pull request, as written to commit-list.json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full 40-character commit SHA
    pub sha: String,
    pub author: CommitAuthor,
    /// Full commit message (subject and body), untrimmed
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

#[cfg(test)]
impl CommitRecord {
    pub fn new(sha: &str, name: &str, email: &str, message: &str) -> Self {
        CommitRecord {
            sha: sha.to_string(),
            author: CommitAuthor {
                name: name.to_string(),
                email: email.to_string(),
            },
            message: message.to_string(),
        }
    }
}
