//! GitHub API client.

use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::traits::GitDataApi;
use crate::types::{Blob, Commit, CreateBlob, CreateCommit, CreateTree, GitRef, Tree, UpdateRef};

// === Internal API response types (shared across methods) ===

/// Internal representation of a commit from the git-data API.
#[derive(serde::Deserialize)]
struct ApiCommit {
    sha: String,
    #[serde(default)]
    message: String,
    tree: ApiObject,
    #[serde(default)]
    parents: Vec<ApiObject>,
}

/// Any `{ "sha": ... }` object reference in a response.
#[derive(serde::Deserialize)]
struct ApiObject {
    sha: String,
}

impl ApiCommit {
    fn into_commit(self) -> Commit {
        Commit {
            sha: self.sha,
            tree_sha: self.tree.sha,
            message: self.message,
            parents: self.parents.into_iter().map(|p| p.sha).collect(),
        }
    }
}

/// Internal representation of a ref from the git-data API.
#[derive(serde::Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    ref_name: String,
    object: ApiObject,
}

impl ApiRef {
    fn into_git_ref(self) -> GitRef {
        GitRef {
            name: self.ref_name,
            sha: self.object.sha,
        }
    }
}

/// GitHub API client.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    /// Token stored as `SecretString` for automatic zeroization on drop.
    token: SecretString,
}

impl GitHubClient {
    /// Default GitHub API URL.
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";

    /// Create a new GitHub client.
    ///
    /// # Errors
    /// Returns error if authentication fails.
    pub fn new(auth: &Auth) -> Result<Self> {
        Self::with_base_url(auth, Self::DEFAULT_API_URL)
    }

    /// Create a new GitHub client with a custom API URL (for GitHub Enterprise).
    ///
    /// # Errors
    /// Returns error if authentication fails.
    pub fn with_base_url(auth: &Auth, base_url: impl Into<String>) -> Result<Self> {
        let token = auth.resolve()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("treepush"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// The API root requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a GET request.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.token.expose_secret()),
            )
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Make a POST request.
    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.token.expose_secret()),
            )
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Make a PATCH request.
    async fn patch<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "PATCH");
        let response = self
            .client
            .patch(&url)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.token.expose_secret()),
            )
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.json().await?;
            return Ok(body);
        }

        // Handle error responses
        let status_code = status.as_u16();

        match status_code {
            401 => Err(Error::AuthenticationFailed),
            403 if response
                .headers()
                .get("x-ratelimit-remaining")
                .is_some_and(|v| v == "0") =>
            {
                Err(Error::RateLimited)
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                tracing::debug!(status = status_code, body = %text, "GitHub API error");
                Err(Error::ApiError {
                    status: status_code,
                    message: text,
                })
            }
        }
    }

    // === Object Operations ===

    /// Create a blob.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn create_blob(&self, owner: &str, repo: &str, blob: CreateBlob) -> Result<Blob> {
        self.post(&format!("/repos/{owner}/{repo}/git/blobs"), &blob)
            .await
    }

    /// Create a tree.
    ///
    /// # Errors
    /// Returns error if the API call fails (e.g. an unknown base tree).
    pub async fn create_tree(&self, owner: &str, repo: &str, tree: CreateTree) -> Result<Tree> {
        self.post(&format!("/repos/{owner}/{repo}/git/trees"), &tree)
            .await
    }

    /// Fetch a tree by SHA or ref name.
    ///
    /// # Errors
    /// Returns error if the tree doesn't exist or the API call fails.
    pub async fn get_tree(
        &self,
        owner: &str,
        repo: &str,
        tree_ish: &str,
        recursive: bool,
    ) -> Result<Tree> {
        let path = if recursive {
            format!("/repos/{owner}/{repo}/git/trees/{tree_ish}?recursive=1")
        } else {
            format!("/repos/{owner}/{repo}/git/trees/{tree_ish}")
        };
        self.get(&path).await
    }

    /// Fetch a commit.
    ///
    /// # Errors
    /// Returns error if the commit doesn't exist or the API call fails.
    pub async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<Commit> {
        let api_commit: ApiCommit = self
            .get(&format!("/repos/{owner}/{repo}/git/commits/{sha}"))
            .await?;

        Ok(api_commit.into_commit())
    }

    /// Create a commit.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        commit: CreateCommit,
    ) -> Result<Commit> {
        let api_commit: ApiCommit = self
            .post(&format!("/repos/{owner}/{repo}/git/commits"), &commit)
            .await?;

        Ok(api_commit.into_commit())
    }

    // === Ref Operations ===

    /// Get the head of a branch.
    ///
    /// # Errors
    /// Returns error if the branch doesn't exist or the API call fails.
    pub async fn get_ref(&self, owner: &str, repo: &str, branch: &str) -> Result<GitRef> {
        let api_ref: ApiRef = self
            .get(&format!("/repos/{owner}/{repo}/git/ref/heads/{branch}"))
            .await?;

        Ok(api_ref.into_git_ref())
    }

    /// Move a branch to a new commit.
    ///
    /// GitHub answers 422 when `force` is false and the move is not a fast-forward.
    ///
    /// # Errors
    /// Returns error if the update is rejected or the API call fails.
    pub async fn update_ref(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        update: UpdateRef,
    ) -> Result<GitRef> {
        let api_ref: ApiRef = self
            .patch(
                &format!("/repos/{owner}/{repo}/git/refs/heads/{branch}"),
                &update,
            )
            .await?;

        Ok(api_ref.into_git_ref())
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .field("token", &"[redacted]")
            .finish_non_exhaustive()
    }
}

// === Trait Implementation ===

impl GitDataApi for GitHubClient {
    async fn create_blob(&self, owner: &str, repo: &str, blob: CreateBlob) -> Result<Blob> {
        self.create_blob(owner, repo, blob).await
    }

    async fn create_tree(&self, owner: &str, repo: &str, tree: CreateTree) -> Result<Tree> {
        self.create_tree(owner, repo, tree).await
    }

    async fn get_tree(
        &self,
        owner: &str,
        repo: &str,
        tree_ish: &str,
        recursive: bool,
    ) -> Result<Tree> {
        self.get_tree(owner, repo, tree_ish, recursive).await
    }

    async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<Commit> {
        self.get_commit(owner, repo, sha).await
    }

    async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        commit: CreateCommit,
    ) -> Result<Commit> {
        self.create_commit(owner, repo, commit).await
    }

    async fn get_ref(&self, owner: &str, repo: &str, branch: &str) -> Result<GitRef> {
        self.get_ref(owner, repo, branch).await
    }

    async fn update_ref(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        update: UpdateRef,
    ) -> Result<GitRef> {
        self.update_ref(owner, repo, branch, update).await
    }
}
