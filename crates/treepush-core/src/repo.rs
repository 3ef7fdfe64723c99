//! Target repository and branch identifiers.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A GitHub repository as `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    /// Owning user or organization.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl FromStr for RepoId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_end_matches(".git");
        let valid_part = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "-_.".contains(c))
        };

        match trimmed.split_once('/') {
            Some((owner, name)) if valid_part(owner) && valid_part(name) => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(Error::InvalidRepository(s.to_string())),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Check that a branch name is safe to place in a ref URL.
///
/// # Errors
/// Returns [`Error::InvalidBranchName`] describing the first violated rule.
pub fn validate_branch(name: &str) -> Result<()> {
    let reject = |reason: &str| {
        Err(Error::InvalidBranchName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.is_empty() {
        return reject("branch name cannot be empty");
    }
    if name.starts_with('/') || name.ends_with('/') || name.contains("//") {
        return reject("branch name cannot have empty path components");
    }
    if name.starts_with('.') || name.contains("/.") || name.contains("..") {
        return reject("path components cannot start with '.' or contain '..'");
    }
    if name.ends_with(".lock") {
        return reject("branch name cannot end with '.lock'");
    }
    if name.contains("@{") {
        return reject("branch name cannot contain '@{'");
    }
    if let Some(c) = name
        .chars()
        .find(|c| c.is_ascii_control() || c.is_whitespace() || "~^:?*[\\#%&".contains(*c))
    {
        return reject(&format!("branch name cannot contain '{}'", c.escape_default()));
    }
    Ok(())
}
