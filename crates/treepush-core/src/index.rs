//! In-memory index of the remote tree.
//!
//! The index maps full repository paths to the last-known object at each
//! path. It is filled lazily: a directory whose tree has not been fetched has
//! no entries below it, which is indistinguishable from an empty directory
//! here. Callers that need to tell the two apart fetch the directory first,
//! or pass the directory's own SHA as a base tree.

use std::collections::BTreeMap;

use treepush_github::{Tree, TreeEntry};

use crate::object::{ChildEntry, ObjectRef};
use crate::repo_path::{ROOT, join};

/// Flat, path-keyed snapshot of a remote tree.
#[derive(Debug, Clone)]
pub struct RemoteTreeIndex {
    root: ObjectRef,
    entries: BTreeMap<String, ObjectRef>,
}

impl RemoteTreeIndex {
    /// Create an index that knows only the root tree's SHA.
    #[must_use]
    pub fn new(root_sha: impl Into<String>) -> Self {
        Self {
            root: ObjectRef::tree(ROOT, root_sha),
            entries: BTreeMap::new(),
        }
    }

    /// Create an index from a fetched root tree listing.
    #[must_use]
    pub fn from_root_tree(tree: &Tree) -> Self {
        let mut index = Self::new(tree.sha.clone());
        index.import_subtree(ROOT, &tree.entries);
        index
    }

    /// The current root tree.
    #[must_use]
    pub const fn root(&self) -> &ObjectRef {
        &self.root
    }

    /// Replace the root tree.
    pub fn set_root(&mut self, sha: impl Into<String>) {
        self.root = ObjectRef::tree(ROOT, sha);
    }

    /// Look up the object at `path`. [`ROOT`] yields the root tree.
    ///
    /// `None` means either "never fetched" or "does not exist".
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&ObjectRef> {
        if path == ROOT {
            Some(&self.root)
        } else {
            self.entries.get(path)
        }
    }

    /// Check if an object is indexed at `path`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Insert or replace the object at `object.path`.
    ///
    /// An object at [`ROOT`] replaces the root tree.
    pub fn set(&mut self, object: ObjectRef) {
        if object.path == ROOT {
            self.root = object;
        } else {
            self.entries.insert(object.path.clone(), object);
        }
    }

    /// Import a fetched listing of the directory at `prefix`.
    ///
    /// Entry paths are relative to `prefix`; recursive listings may contain
    /// nested paths. Re-importing unchanged entries is a no-op.
    pub fn import_subtree(&mut self, prefix: &str, entries: &[TreeEntry]) {
        for entry in entries.iter().filter(|e| !e.path.is_empty()) {
            self.set(ObjectRef::new(
                join(prefix, &entry.path),
                entry.mode,
                entry.sha.clone(),
            ));
        }
    }

    /// Direct children of the directory at `path`, ordered by name.
    ///
    /// Empty when nothing below `path` is indexed.
    #[must_use]
    pub fn children_of(&self, path: &str) -> Vec<ChildEntry> {
        let to_child = |name: &str, object: &ObjectRef| ChildEntry {
            name: name.to_string(),
            mode: object.mode,
            sha: object.sha.clone(),
        };

        if path == ROOT {
            return self
                .entries
                .iter()
                .filter(|(key, _)| !key.contains('/'))
                .map(|(key, object)| to_child(key, object))
                .collect();
        }

        let prefix = format!("{path}/");
        self.entries
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter_map(|(key, object)| {
                let name = &key[prefix.len()..];
                (!name.is_empty() && !name.contains('/')).then(|| to_child(name, object))
            })
            .collect()
    }

    /// Number of indexed objects, root excluded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing below the root is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
