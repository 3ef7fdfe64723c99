//! GitHub git-data API types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// File mode of a tree entry, as the git-data API spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryMode {
    /// Regular file.
    #[serde(rename = "100644")]
    File,
    /// Executable file.
    #[serde(rename = "100755")]
    Executable,
    /// Symbolic link.
    #[serde(rename = "120000")]
    Symlink,
    /// Subdirectory (tree).
    #[serde(rename = "040000")]
    Directory,
    /// Submodule (commit).
    #[serde(rename = "160000")]
    Submodule,
}

impl EntryMode {
    /// The mode string sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "100644",
            Self::Executable => "100755",
            Self::Symlink => "120000",
            Self::Directory => "040000",
            Self::Submodule => "160000",
        }
    }

    /// The object type an entry with this mode points to.
    #[must_use]
    pub const fn object_type(self) -> ObjectType {
        match self {
            Self::File | Self::Executable | Self::Symlink => ObjectType::Blob,
            Self::Directory => ObjectType::Tree,
            Self::Submodule => ObjectType::Commit,
        }
    }

    /// Check if this mode denotes a directory.
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl fmt::Display for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of git object a tree entry references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

/// Request to create a blob.
#[derive(Debug, Serialize)]
pub struct CreateBlob {
    /// Blob content.
    pub content: String,

    /// Content encoding; always `utf-8` for text uploads.
    pub encoding: &'static str,
}

impl CreateBlob {
    /// Blob request for UTF-8 text.
    #[must_use]
    pub fn utf8(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            encoding: "utf-8",
        }
    }
}

/// A created blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// Blob SHA.
    pub sha: String,
}

/// An entry in a tree creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTreeEntry {
    /// Entry name (relative to the tree being created).
    pub path: String,

    /// Entry mode.
    pub mode: EntryMode,

    /// Object type; must agree with `mode`.
    #[serde(rename = "type")]
    pub kind: ObjectType,

    /// SHA of the referenced object.
    pub sha: String,
}

impl NewTreeEntry {
    /// Build an entry whose type is derived from its mode.
    #[must_use]
    pub fn new(path: impl Into<String>, mode: EntryMode, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode,
            kind: mode.object_type(),
            sha: sha.into(),
        }
    }
}

/// Request to create a tree.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTree {
    /// Tree to start from. `None` creates a tree from an empty base.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_tree: Option<String>,

    /// Entries to place on top of the base.
    pub tree: Vec<NewTreeEntry>,
}

/// An entry of a fetched tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Path relative to the fetched tree (contains `/` for recursive listings).
    pub path: String,

    /// Entry mode.
    pub mode: EntryMode,

    /// Object type.
    #[serde(rename = "type")]
    pub kind: ObjectType,

    /// SHA of the referenced object.
    pub sha: String,
}

/// A git tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    /// Tree SHA.
    pub sha: String,

    /// Tree entries.
    #[serde(rename = "tree", default)]
    pub entries: Vec<TreeEntry>,

    /// Whether GitHub cut the listing short.
    #[serde(default)]
    pub truncated: bool,
}

/// Request to create a commit.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCommit {
    /// Commit message.
    pub message: String,

    /// SHA of the root tree.
    pub tree: String,

    /// Parent commit SHAs.
    pub parents: Vec<String>,
}

/// A git commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit SHA.
    pub sha: String,

    /// SHA of the commit's root tree.
    pub tree_sha: String,

    /// Commit message.
    pub message: String,

    /// Parent commit SHAs.
    pub parents: Vec<String>,
}

/// Request to move a ref.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRef {
    /// New target commit.
    pub sha: String,

    /// Allow non-fast-forward updates.
    pub force: bool,
}

/// A git reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRef {
    /// Full ref name (e.g. `refs/heads/main`).
    pub name: String,

    /// Commit SHA the ref points at.
    pub sha: String,
}
