//! Splicing a changed file into the remote tree.
//!
//! A splice uploads one blob and then rebuilds every tree on the path from
//! the file's directory up to the root. Each rebuilt tree starts from the
//! old tree (as a base) and lists the directory's indexed children with the
//! one changed child swapped in. Everything off that path is reused by SHA.

use treepush_github::{CreateBlob, CreateTree, EntryMode, GitDataApi};

use crate::error::{Error, Result};
use crate::index::RemoteTreeIndex;
use crate::object::{ChildEntry, ObjectRef, PendingChange};
use crate::repo_path::{ROOT, basename};

/// Applies pending changes to a [`RemoteTreeIndex`] through a [`GitDataApi`].
pub struct TreeSplicer<'a, A>
where
    A: GitDataApi,
{
    api: &'a A,
    owner: &'a str,
    repo: &'a str,
}

impl<'a, A> TreeSplicer<'a, A>
where
    A: GitDataApi,
{
    /// Create a splicer for one repository.
    pub const fn new(api: &'a A, owner: &'a str, repo: &'a str) -> Self {
        Self { api, owner, repo }
    }

    /// Upload `change` and rebuild its ancestor trees, returning the new root.
    ///
    /// The index must not be shared with another splice while this runs; the
    /// `&mut` borrow guarantees that. On success every new object is indexed
    /// and the index root is the returned tree.
    ///
    /// # Errors
    /// Returns the first failing API call, or [`Error::InconsistentIndex`].
    /// Objects indexed before the failure stay indexed; the root is left
    /// untouched.
    pub async fn splice(
        &self,
        index: &mut RemoteTreeIndex,
        change: &PendingChange,
    ) -> Result<ObjectRef> {
        let path = change.path();

        let blob = self
            .api
            .create_blob(self.owner, self.repo, CreateBlob::utf8(change.content()))
            .await?;
        tracing::debug!(path = %path, sha = %blob.sha, "created blob");

        // Existing files keep their mode; only new paths become regular files.
        let mode = index
            .get(path.as_str())
            .filter(|existing| !existing.is_tree())
            .map_or(EntryMode::File, |existing| existing.mode);
        let mut current = ObjectRef::new(path.as_str(), mode, blob.sha);
        index.set(current.clone());

        for dir in path.ancestors() {
            current = self.rebuild_tree(index, dir, &current).await?;
            // The root is swapped in only once the whole chain exists.
            if dir != ROOT {
                index.set(current.clone());
            }
        }

        index.set_root(current.sha.clone());
        tracing::info!(path = %path, root = %current.sha, "spliced file");
        Ok(current)
    }

    /// Create a new tree for `dir` with `child` replacing its namesake.
    async fn rebuild_tree(
        &self,
        index: &RemoteTreeIndex,
        dir: &str,
        child: &ObjectRef,
    ) -> Result<ObjectRef> {
        let name = basename(&child.path);

        let mut children: Vec<ChildEntry> = index
            .children_of(dir)
            .into_iter()
            .filter(|c| c.name != name)
            .collect();

        let base_tree = index
            .get(dir)
            .filter(|existing| existing.is_tree())
            .map(|existing| existing.sha.clone());

        if dir != ROOT && base_tree.is_none() && !children.is_empty() {
            return Err(Error::InconsistentIndex {
                path: dir.to_string(),
                reason: format!(
                    "{} indexed entries below a directory that has no tree of its own",
                    children.len()
                ),
            });
        }

        children.push(ChildEntry {
            name: name.to_string(),
            mode: child.mode,
            sha: child.sha.clone(),
        });

        tracing::debug!(
            dir = %dir,
            base = base_tree.as_deref().unwrap_or("<none>"),
            entries = children.len(),
            "creating tree"
        );

        let tree = self
            .api
            .create_tree(
                self.owner,
                self.repo,
                CreateTree {
                    base_tree,
                    tree: children.into_iter().map(ChildEntry::into_tree_entry).collect(),
                },
            )
            .await?;

        Ok(ObjectRef::tree(dir, tree.sha))
    }
}
