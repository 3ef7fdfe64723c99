//! Error types for treepush-core.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in treepush-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A remote object call failed (transport or service error).
    #[error(transparent)]
    Api(#[from] treepush_github::Error),

    /// The tree index contradicts itself.
    #[error("inconsistent tree index at '{path}': {reason}")]
    InconsistentIndex {
        /// Directory being rebuilt.
        path: String,
        /// What was missing or contradictory.
        reason: String,
    },

    /// A repository path could not be normalized.
    #[error("invalid repository path '{path}': {reason}")]
    InvalidPath {
        /// The path as given.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },

    /// File content is not valid UTF-8.
    #[error("{0} is not a UTF-8 text file")]
    BinaryContent(String),

    /// Repository identifier is not `owner/name`.
    #[error("invalid repository '{0}' - expected <owner>/<name>")]
    InvalidRepository(String),

    /// Invalid branch name.
    #[error("invalid branch name '{name}': {reason}")]
    InvalidBranchName {
        /// The invalid name.
        name: String,
        /// Why the name is invalid.
        reason: String,
    },

    /// Branch does not exist on the remote.
    #[error("branch not found: {0}")]
    RefNotFound(String),

    /// An upload plan was executed against a request it was not built from.
    #[error("upload plan covers {planned} file(s) but the request has {requested}")]
    PlanMismatch {
        /// Files in the plan.
        planned: usize,
        /// Changes in the request.
        requested: usize,
    },

    /// Nothing to upload.
    #[error("no files to upload")]
    NoChanges,

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
