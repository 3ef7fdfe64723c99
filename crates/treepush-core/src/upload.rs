//! Upload driver: load the remote tree, splice every file, commit, move the branch.
//!
//! Planning is read-only; execution creates objects and only touches the
//! branch once the commit exists, so a failed run never leaves the branch
//! pointing at a partial tree.

use std::collections::BTreeSet;

use futures::future::try_join_all;
use serde::Serialize;
use treepush_github::{CreateCommit, GitDataApi, UpdateRef};

use crate::error::{Error, Result};
use crate::index::RemoteTreeIndex;
use crate::object::{ObjectRef, PendingChange};
use crate::repo::{RepoId, validate_branch};
use crate::repo_path::RepoPath;
use crate::splice::TreeSplicer;

/// What to upload and where.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Branch to commit on.
    pub branch: String,
    /// Commit message.
    pub message: String,
    /// Files, applied in this order.
    pub changes: Vec<PendingChange>,
}

/// Whether a file is new on the branch or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    Created,
    Updated,
}

/// A file the plan will write.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedFile {
    pub path: String,
    pub action: FileAction,
}

/// Read-only result of inspecting the branch.
#[derive(Debug, Clone)]
pub struct UploadPlan {
    /// Commit the branch currently points at; parent of the new commit.
    pub head: String,
    /// Index holding the root listing and every touched top-level directory.
    pub index: RemoteTreeIndex,
    /// One entry per change, in request order.
    pub files: Vec<PlannedFile>,
}

/// A file written by [`UploadService::execute`].
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub path: String,
    pub sha: String,
    pub action: FileAction,
}

/// Result of a completed upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub branch: String,
    pub parent: String,
    pub commit: String,
    pub root: String,
    pub files: Vec<UploadedFile>,
    /// Tree objects created across all splices.
    pub trees_created: usize,
}

/// Service for uploads with an injected API client.
pub struct UploadService<'a, A>
where
    A: GitDataApi,
{
    api: &'a A,
    owner: String,
    repo: String,
}

impl<'a, A> UploadService<'a, A>
where
    A: GitDataApi,
{
    /// Create a new upload service.
    #[must_use]
    pub fn new(api: &'a A, repo: &RepoId) -> Self {
        Self {
            api,
            owner: repo.owner.clone(),
            repo: repo.name.clone(),
        }
    }

    /// Resolve the branch head and index its tree as far as `changes` need.
    ///
    /// The root is listed directly; every existing top-level directory that a
    /// change lands in is fetched recursively. Those fetches run concurrently
    /// and all complete before this returns. When a listing comes back
    /// truncated, the directories on each affected change's path are listed
    /// one level at a time instead.
    ///
    /// # Errors
    /// Returns [`Error::RefNotFound`] for an unknown branch, or the first
    /// failing API call.
    pub async fn load_index(
        &self,
        branch: &str,
        changes: &[PendingChange],
    ) -> Result<(String, RemoteTreeIndex)> {
        let head = self
            .api
            .get_ref(&self.owner, &self.repo, branch)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    Error::RefNotFound(branch.to_string())
                } else {
                    e.into()
                }
            })?;
        let commit = self
            .api
            .get_commit(&self.owner, &self.repo, &head.sha)
            .await?;
        let root = self
            .api
            .get_tree(&self.owner, &self.repo, &commit.tree_sha, false)
            .await?;
        tracing::debug!(branch, head = %head.sha, root = %root.sha, "loaded root tree");

        let mut index = RemoteTreeIndex::from_root_tree(&root);

        let top_level: BTreeSet<&str> = changes
            .iter()
            .filter_map(|c| c.path().top_level_dir())
            .collect();
        let to_fetch: Vec<(String, String)> = top_level
            .into_iter()
            .filter_map(|dir| {
                index
                    .get(dir)
                    .filter(|existing| existing.is_tree())
                    .map(|existing| (dir.to_string(), existing.sha.clone()))
            })
            .collect();

        let subtrees = try_join_all(to_fetch.into_iter().map(|(dir, sha)| async move {
            let tree = self
                .api
                .get_tree(&self.owner, &self.repo, &sha, true)
                .await?;
            Ok::<_, Error>((dir, tree))
        }))
        .await?;

        let mut truncated = BTreeSet::new();
        for (dir, tree) in subtrees {
            if tree.truncated {
                tracing::warn!(
                    dir = %dir,
                    "tree listing was truncated; listing touched directories one level at a time"
                );
                truncated.insert(dir.clone());
            }
            tracing::debug!(dir = %dir, entries = tree.entries.len(), "indexed subtree");
            index.import_subtree(&dir, &tree.entries);
        }

        for change in changes {
            let path = change.path();
            if path.top_level_dir().is_some_and(|dir| truncated.contains(dir)) {
                self.fill_listing_gaps(&mut index, path).await?;
            }
        }

        Ok((head.sha, index))
    }

    /// Index every existing directory on `path` that a truncated listing left out.
    ///
    /// Walks down from the top-level directory and lists a directory
    /// non-recursively whenever its next path component is not indexed.
    /// Stops at the first component that does not exist as a tree.
    async fn fill_listing_gaps(
        &self,
        index: &mut RemoteTreeIndex,
        path: &RepoPath,
    ) -> Result<()> {
        let mut chain = path.ancestors();
        chain.reverse();
        chain.push(path.as_str());

        // The first pair is the root and the top-level directory, both already listed.
        for pair in chain.windows(2).skip(1) {
            let (dir, child) = (pair[0], pair[1]);
            if !index.contains(child) {
                let Some(sha) = index
                    .get(dir)
                    .filter(|existing| existing.is_tree())
                    .map(|existing| existing.sha.clone())
                else {
                    break;
                };
                let listing = self
                    .api
                    .get_tree(&self.owner, &self.repo, &sha, false)
                    .await?;
                tracing::debug!(
                    dir,
                    entries = listing.entries.len(),
                    "listed unindexed directory"
                );
                index.import_subtree(dir, &listing.entries);
            }
            if !index.get(child).is_some_and(ObjectRef::is_tree) {
                break;
            }
        }
        Ok(())
    }

    /// Build the upload plan without creating any objects.
    ///
    /// # Errors
    /// Returns error for an empty request, an invalid branch name, or a
    /// failing API call.
    pub async fn create_plan(&self, request: &UploadRequest) -> Result<UploadPlan> {
        if request.changes.is_empty() {
            return Err(Error::NoChanges);
        }
        validate_branch(&request.branch)?;

        let (head, index) = self.load_index(&request.branch, &request.changes).await?;

        let files = request
            .changes
            .iter()
            .map(|change| {
                let exists = index
                    .get(change.path().as_str())
                    .is_some_and(|existing| !existing.is_tree());
                PlannedFile {
                    path: change.path().to_string(),
                    action: if exists {
                        FileAction::Updated
                    } else {
                        FileAction::Created
                    },
                }
            })
            .collect();

        Ok(UploadPlan { head, index, files })
    }

    /// Splice every change in order, commit, and fast-forward the branch.
    ///
    /// # Errors
    /// Returns the first failure. The branch is only updated after the commit
    /// exists; a non-fast-forward update is rejected by the service.
    pub async fn execute(
        &self,
        plan: UploadPlan,
        request: &UploadRequest,
    ) -> Result<UploadOutcome> {
        let UploadPlan {
            head,
            mut index,
            files: planned,
        } = plan;
        let matches_request = planned.len() == request.changes.len()
            && planned
                .iter()
                .zip(&request.changes)
                .all(|(file, change)| file.path == change.path().as_str());
        if !matches_request {
            return Err(Error::PlanMismatch {
                planned: planned.len(),
                requested: request.changes.len(),
            });
        }

        let splicer = TreeSplicer::new(self.api, &self.owner, &self.repo);

        let mut files = Vec::with_capacity(request.changes.len());
        let mut trees_created = 0;
        for (change, planned) in request.changes.iter().zip(planned) {
            splicer.splice(&mut index, change).await?;
            trees_created += change.path().ancestors().len();
            let sha = index
                .get(change.path().as_str())
                .map(|blob| blob.sha.clone())
                .ok_or_else(|| Error::InconsistentIndex {
                    path: change.path().to_string(),
                    reason: "spliced file missing from index".to_string(),
                })?;
            files.push(UploadedFile {
                path: planned.path,
                sha,
                action: planned.action,
            });
        }

        let root = index.root().sha.clone();
        let commit = self
            .api
            .create_commit(
                &self.owner,
                &self.repo,
                CreateCommit {
                    message: request.message.clone(),
                    tree: root.clone(),
                    parents: vec![head.clone()],
                },
            )
            .await?;
        tracing::info!(commit = %commit.sha, root = %root, "created commit");

        self.api
            .update_ref(
                &self.owner,
                &self.repo,
                &request.branch,
                UpdateRef {
                    sha: commit.sha.clone(),
                    force: false,
                },
            )
            .await?;
        tracing::info!(branch = %request.branch, commit = %commit.sha, "updated branch");

        Ok(UploadOutcome {
            branch: request.branch.clone(),
            parent: head,
            commit: commit.sha,
            root,
            files,
            trees_created,
        })
    }

    /// Plan and execute in one go.
    ///
    /// # Errors
    /// See [`Self::create_plan`] and [`Self::execute`].
    pub async fn upload(&self, request: &UploadRequest) -> Result<UploadOutcome> {
        let plan = self.create_plan(request).await?;
        self.execute(plan, request).await
    }
}
