//! # treepush-github
//!
//! Client for the GitHub git-data API: creating blobs, trees and commits,
//! reading trees and moving branch refs. Nothing here needs a local clone.
//!
//! # Security
//!
//! Authentication tokens are stored using `SecretString` which automatically
//! zeroizes memory when dropped, reducing credential exposure in memory dumps.

mod auth;
mod client;
mod error;
mod traits;
mod types;

pub use auth::Auth;
pub use client::GitHubClient;
pub use error::{Error, Result};
pub use traits::GitDataApi;
// Re-export SecretString for constructing Auth::Token
pub use secrecy::SecretString;
pub use types::{
    Blob, Commit, CreateBlob, CreateCommit, CreateTree, EntryMode, GitRef, NewTreeEntry,
    ObjectType, Tree, TreeEntry, UpdateRef,
};
