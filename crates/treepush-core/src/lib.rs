//! # treepush-core
//!
//! Splices local files into a remote git tree without a clone.
//!
//! The [`RemoteTreeIndex`] holds a sparse snapshot of the remote tree; the
//! [`TreeSplicer`] turns one [`PendingChange`] into a blob plus one new tree
//! per ancestor directory; the [`UploadService`] drives a whole run from
//! branch head to fast-forwarded branch.

pub mod config;
pub mod error;
pub mod index;
pub mod object;
pub mod repo;
pub mod repo_path;
pub mod splice;
pub mod upload;

#[cfg(test)]
mod test_mocks;

pub use config::Config;
pub use error::{Error, Result};
pub use index::RemoteTreeIndex;
pub use object::{ChildEntry, ObjectRef, PendingChange};
pub use repo::{RepoId, validate_branch};
pub use repo_path::{ROOT, RepoPath};
pub use splice::TreeSplicer;
pub use upload::{
    FileAction, PlannedFile, UploadOutcome, UploadPlan, UploadRequest, UploadService, UploadedFile,
};
