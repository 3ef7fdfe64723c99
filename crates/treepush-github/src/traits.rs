//! Trait abstractions for git-data API operations.
//!
//! This module defines the `GitDataApi` trait which abstracts the object and
//! ref calls the uploader makes, enabling dependency injection and testability.

use crate::{Blob, Commit, CreateBlob, CreateCommit, CreateTree, GitRef, Result, Tree, UpdateRef};

/// Trait for git-data API operations.
///
/// All methods take `owner` and `repo` as parameters to support
/// operations across different repositories. Every call is attempted once;
/// retries are the caller's decision.
pub trait GitDataApi: Send + Sync {
    // === Object Operations ===

    /// Create a blob and return its SHA.
    fn create_blob(
        &self,
        owner: &str,
        repo: &str,
        blob: CreateBlob,
    ) -> impl std::future::Future<Output = Result<Blob>> + Send;

    /// Create a tree, optionally on top of a base tree.
    fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        tree: CreateTree,
    ) -> impl std::future::Future<Output = Result<Tree>> + Send;

    /// Fetch a tree by SHA or tree-ish ref.
    ///
    /// With `recursive`, entry paths are relative to the fetched tree and
    /// include every descendant.
    fn get_tree(
        &self,
        owner: &str,
        repo: &str,
        tree_ish: &str,
        recursive: bool,
    ) -> impl std::future::Future<Output = Result<Tree>> + Send;

    /// Fetch a commit.
    fn get_commit(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> impl std::future::Future<Output = Result<Commit>> + Send;

    /// Create a commit.
    fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        commit: CreateCommit,
    ) -> impl std::future::Future<Output = Result<Commit>> + Send;

    // === Ref Operations ===

    /// Get the head of a branch.
    fn get_ref(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> impl std::future::Future<Output = Result<GitRef>> + Send;

    /// Move a branch to a new commit.
    fn update_ref(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        update: UpdateRef,
    ) -> impl std::future::Future<Output = Result<GitRef>> + Send;
}
