//! Object references and pending changes.

use serde::Serialize;
use treepush_github::{EntryMode, NewTreeEntry};

use crate::error::{Error, Result};
use crate::repo_path::RepoPath;

/// A remote object as seen at a particular path.
///
/// Content-addressed: a changed file is always a new `ObjectRef`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectRef {
    /// Full repository-relative path; empty for the root tree.
    pub path: String,

    /// Entry mode.
    pub mode: EntryMode,

    /// Object SHA.
    pub sha: String,
}

impl ObjectRef {
    /// Create an object reference.
    #[must_use]
    pub fn new(path: impl Into<String>, mode: EntryMode, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode,
            sha: sha.into(),
        }
    }

    /// A tree at `path`.
    #[must_use]
    pub fn tree(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self::new(path, EntryMode::Directory, sha)
    }

    /// Check if this references a tree.
    #[must_use]
    pub const fn is_tree(&self) -> bool {
        self.mode.is_directory()
    }
}

/// A direct child of a directory, named relative to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    /// Name within the directory (no `/`).
    pub name: String,

    /// Entry mode.
    pub mode: EntryMode,

    /// Object SHA.
    pub sha: String,
}

impl ChildEntry {
    /// Convert into a tree-creation entry.
    #[must_use]
    pub fn into_tree_entry(self) -> NewTreeEntry {
        NewTreeEntry::new(self.name, self.mode, self.sha)
    }
}

/// One local file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    path: RepoPath,
    content: String,
}

impl PendingChange {
    /// Create a change from text content.
    #[must_use]
    pub fn new(path: RepoPath, content: impl Into<String>) -> Self {
        Self {
            path,
            content: content.into(),
        }
    }

    /// Create a change from raw file bytes.
    ///
    /// # Errors
    /// Returns [`Error::BinaryContent`] if the bytes are not UTF-8.
    pub fn from_bytes(path: RepoPath, bytes: Vec<u8>) -> Result<Self> {
        let content =
            String::from_utf8(bytes).map_err(|_| Error::BinaryContent(path.to_string()))?;
        Ok(Self { path, content })
    }

    /// Destination path in the repository.
    #[must_use]
    pub const fn path(&self) -> &RepoPath {
        &self.path
    }

    /// File content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}
