//! In-memory git-data service for testing the splicer and upload driver.
//!
//! Trees are stored as flat entry lists keyed by SHA, so a tree created on top
//! of a base really does inherit the base's entries, the way GitHub does it.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use treepush_github::{
    Blob, Commit, CreateBlob, CreateCommit, CreateTree, EntryMode, Error as ApiError, GitDataApi,
    GitRef, Result as ApiResult, Tree, TreeEntry, UpdateRef,
};

/// A recorded call against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    CreateBlob,
    CreateTree {
        base: Option<String>,
        names: Vec<String>,
    },
    GetTree {
        sha: String,
        recursive: bool,
    },
    GetCommit(String),
    CreateCommit {
        tree: String,
        parents: Vec<String>,
    },
    GetRef(String),
    UpdateRef {
        branch: String,
        sha: String,
        force: bool,
    },
}

/// Which call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    CreateBlob,
    /// The n-th (0-based) tree creation.
    CreateTree(usize),
    GetTree,
    CreateCommit,
    UpdateRef,
}

#[derive(Default)]
struct Store {
    blobs: HashMap<String, String>,
    trees: HashMap<String, Vec<TreeEntry>>,
    commits: HashMap<String, Commit>,
    refs: HashMap<String, String>,
    truncated: HashSet<String>,
    calls: Vec<ApiCall>,
    next_id: usize,
    trees_created: usize,
}

impl Store {
    fn next_sha(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("{kind}-{}", self.next_id)
    }
}

/// Mock implementation of `GitDataApi`.
#[derive(Default)]
pub struct MockGitData {
    store: Mutex<Store>,
    fail_on: Option<FailOn>,
}

#[allow(clippy::unwrap_used, dead_code)]
impl MockGitData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a tree with direct entries `(name, mode, sha)`.
    pub fn with_tree(self, sha: &str, entries: &[(&str, EntryMode, &str)]) -> Self {
        let entries = entries
            .iter()
            .map(|(name, mode, sha)| TreeEntry {
                path: (*name).to_string(),
                mode: *mode,
                kind: mode.object_type(),
                sha: (*sha).to_string(),
            })
            .collect();
        self.store.lock().unwrap().trees.insert(sha.to_string(), entries);
        self
    }

    /// Seed a commit pointing at `tree`.
    pub fn with_commit(self, sha: &str, tree: &str) -> Self {
        self.store.lock().unwrap().commits.insert(
            sha.to_string(),
            Commit {
                sha: sha.to_string(),
                tree_sha: tree.to_string(),
                message: "seed".to_string(),
                parents: vec![],
            },
        );
        self
    }

    /// Seed a branch pointing at `commit`.
    pub fn with_branch(self, name: &str, commit: &str) -> Self {
        self.store
            .lock()
            .unwrap()
            .refs
            .insert(name.to_string(), commit.to_string());
        self
    }

    /// Truncate recursive listings of `sha`: nested directories and
    /// everything below them are left out.
    pub fn with_truncated_listing(self, sha: &str) -> Self {
        self.store.lock().unwrap().truncated.insert(sha.to_string());
        self
    }

    pub fn fail_on(mut self, fail_on: FailOn) -> Self {
        self.fail_on = Some(fail_on);
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.store.lock().unwrap().calls.clone()
    }

    pub fn blob_content(&self, sha: &str) -> Option<String> {
        self.store.lock().unwrap().blobs.get(sha).cloned()
    }

    pub fn branch_head(&self, name: &str) -> Option<String> {
        self.store.lock().unwrap().refs.get(name).cloned()
    }

    pub fn commit(&self, sha: &str) -> Option<Commit> {
        self.store.lock().unwrap().commits.get(sha).cloned()
    }

    /// A stored tree as the API would list it.
    pub fn tree(&self, sha: &str, recursive: bool) -> Tree {
        let store = self.store.lock().unwrap();
        Tree {
            sha: sha.to_string(),
            entries: list_tree(&store, sha, recursive),
            truncated: false,
        }
    }

    /// Every path below a tree mapped to its SHA.
    pub fn flatten(&self, sha: &str) -> BTreeMap<String, String> {
        self.tree(sha, true)
            .entries
            .into_iter()
            .map(|e| (e.path, e.sha))
            .collect()
    }

    fn fails(&self, call: FailOn) -> bool {
        self.fail_on == Some(call)
    }

    fn failure(call: &str) -> ApiError {
        ApiError::ApiError {
            status: 500,
            message: format!("mock {call} failed"),
        }
    }
}

fn list_tree(store: &Store, sha: &str, recursive: bool) -> Vec<TreeEntry> {
    let mut listing = Vec::new();
    for entry in store.trees.get(sha).cloned().unwrap_or_default() {
        let nested = recursive && entry.mode.is_directory();
        let child_sha = entry.sha.clone();
        let prefix = entry.path.clone();
        listing.push(entry);
        if nested {
            for mut child in list_tree(store, &child_sha, true) {
                child.path = format!("{prefix}/{}", child.path);
                listing.push(child);
            }
        }
    }
    listing
}

#[allow(clippy::unwrap_used)]
impl GitDataApi for MockGitData {
    async fn create_blob(&self, _owner: &str, _repo: &str, blob: CreateBlob) -> ApiResult<Blob> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(ApiCall::CreateBlob);
        if self.fails(FailOn::CreateBlob) {
            return Err(Self::failure("create_blob"));
        }
        let sha = store.next_sha("blob");
        store.blobs.insert(sha.clone(), blob.content);
        Ok(Blob { sha })
    }

    async fn create_tree(&self, _owner: &str, _repo: &str, tree: CreateTree) -> ApiResult<Tree> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(ApiCall::CreateTree {
            base: tree.base_tree.clone(),
            names: tree.tree.iter().map(|e| e.path.clone()).collect(),
        });
        let attempt = store.trees_created;
        store.trees_created += 1;
        if self.fails(FailOn::CreateTree(attempt)) {
            return Err(Self::failure("create_tree"));
        }

        let mut merged: BTreeMap<String, TreeEntry> = BTreeMap::new();
        if let Some(base) = &tree.base_tree {
            let Some(entries) = store.trees.get(base) else {
                return Err(ApiError::ApiError {
                    status: 422,
                    message: format!("unknown base tree {base}"),
                });
            };
            for entry in entries {
                merged.insert(entry.path.clone(), entry.clone());
            }
        }
        for entry in tree.tree {
            merged.insert(
                entry.path.clone(),
                TreeEntry {
                    path: entry.path,
                    mode: entry.mode,
                    kind: entry.kind,
                    sha: entry.sha,
                },
            );
        }

        let sha = store.next_sha("tree");
        let entries: Vec<TreeEntry> = merged.into_values().collect();
        store.trees.insert(sha.clone(), entries.clone());
        Ok(Tree {
            sha,
            entries,
            truncated: false,
        })
    }

    async fn get_tree(
        &self,
        _owner: &str,
        _repo: &str,
        tree_ish: &str,
        recursive: bool,
    ) -> ApiResult<Tree> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(ApiCall::GetTree {
            sha: tree_ish.to_string(),
            recursive,
        });
        if self.fails(FailOn::GetTree) {
            return Err(Self::failure("get_tree"));
        }
        if !store.trees.contains_key(tree_ish) {
            return Err(ApiError::ApiError {
                status: 404,
                message: "Not Found".to_string(),
            });
        }
        let mut entries = list_tree(&store, tree_ish, recursive);
        let truncated = recursive && store.truncated.contains(tree_ish);
        if truncated {
            entries.retain(|e| !e.path.contains('/') && !e.mode.is_directory());
        }
        Ok(Tree {
            sha: tree_ish.to_string(),
            entries,
            truncated,
        })
    }

    async fn get_commit(&self, _owner: &str, _repo: &str, sha: &str) -> ApiResult<Commit> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(ApiCall::GetCommit(sha.to_string()));
        store.commits.get(sha).cloned().ok_or(ApiError::ApiError {
            status: 404,
            message: "Not Found".to_string(),
        })
    }

    async fn create_commit(
        &self,
        _owner: &str,
        _repo: &str,
        commit: CreateCommit,
    ) -> ApiResult<Commit> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(ApiCall::CreateCommit {
            tree: commit.tree.clone(),
            parents: commit.parents.clone(),
        });
        if self.fails(FailOn::CreateCommit) {
            return Err(Self::failure("create_commit"));
        }
        let sha = store.next_sha("commit");
        let created = Commit {
            sha: sha.clone(),
            tree_sha: commit.tree,
            message: commit.message,
            parents: commit.parents,
        };
        store.commits.insert(sha, created.clone());
        Ok(created)
    }

    async fn get_ref(&self, _owner: &str, _repo: &str, branch: &str) -> ApiResult<GitRef> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(ApiCall::GetRef(branch.to_string()));
        store
            .refs
            .get(branch)
            .map(|sha| GitRef {
                name: format!("refs/heads/{branch}"),
                sha: sha.clone(),
            })
            .ok_or(ApiError::ApiError {
                status: 404,
                message: "Not Found".to_string(),
            })
    }

    async fn update_ref(
        &self,
        _owner: &str,
        _repo: &str,
        branch: &str,
        update: UpdateRef,
    ) -> ApiResult<GitRef> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(ApiCall::UpdateRef {
            branch: branch.to_string(),
            sha: update.sha.clone(),
            force: update.force,
        });
        if self.fails(FailOn::UpdateRef) {
            return Err(Self::failure("update_ref"));
        }

        let current = store.refs.get(branch).cloned();
        let fast_forward = store
            .commits
            .get(&update.sha)
            .is_some_and(|c| current.as_ref().is_none_or(|head| c.parents.contains(head)));
        if !update.force && !fast_forward {
            return Err(ApiError::ApiError {
                status: 422,
                message: "Update is not a fast forward".to_string(),
            });
        }

        store.refs.insert(branch.to_string(), update.sha.clone());
        Ok(GitRef {
            name: format!("refs/heads/{branch}"),
            sha: update.sha,
        })
    }
}
