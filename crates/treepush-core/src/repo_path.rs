//! Repository-relative paths.
//!
//! Paths inside the remote tree are `/`-separated and relative to the root
//! tree. The root directory itself is the empty path, [`ROOT`].

use std::fmt;

use crate::error::{Error, Result};

/// Sentinel path of the root tree.
pub const ROOT: &str = "";

/// A validated, normalized repository path of a file.
///
/// Never empty, never absolute, no `.` or `..` components, no empty
/// components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoPath(String);

impl RepoPath {
    /// Normalize and validate a path.
    ///
    /// Backslashes are treated as separators, `.` and empty components are
    /// dropped.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPath`] for absolute paths, `..` components or
    /// paths that normalize to nothing.
    pub fn new(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        let unified = raw.replace('\\', "/");
        if unified.starts_with('/') {
            return Err(invalid("path must be relative to the repository root"));
        }

        let mut components = Vec::new();
        for component in unified.split('/') {
            match component {
                "" | "." => {}
                ".." => return Err(invalid("'..' is not allowed")),
                c => components.push(c),
            }
        }

        if components.is_empty() {
            return Err(invalid("path is empty"));
        }

        Ok(Self(components.join("/")))
    }

    /// Get the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final component.
    #[must_use]
    pub fn file_name(&self) -> &str {
        basename(&self.0)
    }

    /// First component when the path lies inside a directory.
    #[must_use]
    pub fn top_level_dir(&self) -> Option<&str> {
        self.0.split_once('/').map(|(top, _)| top)
    }

    /// Directories containing this path, innermost first, ending with [`ROOT`].
    #[must_use]
    pub fn ancestors(&self) -> Vec<&str> {
        let mut dirs = Vec::new();
        let mut current = self.0.as_str();
        while current != ROOT {
            current = parent(current);
            dirs.push(current);
        }
        dirs
    }
}

impl AsRef<str> for RepoPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parent directory of a path; [`ROOT`] for top-level entries.
#[must_use]
pub fn parent(path: &str) -> &str {
    path.rsplit_once('/').map_or(ROOT, |(dir, _)| dir)
}

/// Last component of a path.
#[must_use]
pub fn basename(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// Join a directory and a relative path.
#[must_use]
pub fn join(dir: &str, relative: &str) -> String {
    if dir == ROOT {
        relative.to_string()
    } else {
        format!("{dir}/{relative}")
    }
}
