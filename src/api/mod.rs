//! Typed Gitea API
//!
//! `GiteaClient` wraps an opened [`Connection`] and maps each operation to
//! one endpoint under `<server>/api/v1`. Listings walk every page.
//!
//! ```rust,ignore
//! use gitea_client::{AuthToken, BackendRegistry, ConnectionRequest, GiteaClient, StateFilter};
//!
//! let request = ConnectionRequest::new("https://gitea.example.com")
//!     .auth(AuthToken::bearer("token"));
//! let mut client = GiteaClient::open(BackendRegistry::global(), &request).await?;
//! let pulls = client.fetch_pull_requests("owner", "repo", StateFilter::Open).await?;
//! client.close().await?;
//! ```

mod model;

pub use model::{
    Branch, Commit, CommitMeta, CommitStatus, CommitStatusState, CreateHookOption,
    CreateReleaseOption, CreateStatusOption, EditHookOption, Hook, Issue, Label, Organization,
    Owner, PayloadCommit, Permissions, PullRequest, PullRequestBranch, Release, RepoCommit,
    Repository, ServerVersion, Tag, User,
};

use crate::connection::{ApiRequest, BackendRegistry, Connection, ConnectionRequest};
use crate::error::{Error, Result};
use crate::pagination::{fetch_all, PagedResult};
use crate::types::{Method, StateFilter};
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

/// Where a webhook lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookScope<'a> {
    /// Hooks of one repository
    Repository { owner: &'a str, repo: &'a str },
    /// Hooks of an organization
    Organization(&'a str),
}

impl HookScope<'_> {
    fn segments(&self) -> Vec<&str> {
        match *self {
            HookScope::Repository { owner, repo } => vec!["repos", owner, repo, "hooks"],
            HookScope::Organization(org) => vec!["orgs", org, "hooks"],
        }
    }
}

/// Typed operations over one session
pub struct GiteaClient {
    connection: Box<dyn Connection>,
}

impl GiteaClient {
    /// Wrap an already opened connection
    pub fn new(connection: Box<dyn Connection>) -> Self {
        Self { connection }
    }

    /// Open a session through the registry
    pub async fn open(registry: &BackendRegistry, request: &ConnectionRequest) -> Result<Self> {
        Ok(Self::new(registry.open(request).await?))
    }

    /// Server this client talks to
    pub fn server_url(&self) -> &Url {
        self.connection.server_url()
    }

    /// The underlying session
    pub fn connection(&mut self) -> &mut dyn Connection {
        self.connection.as_mut()
    }

    /// Release the session. Closing twice is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        self.connection.close().await
    }

    /// Check if the session has been released
    pub fn is_closed(&self) -> bool {
        self.connection.is_closed()
    }

    // ========================================================================
    // Request helpers
    // ========================================================================

    /// Build `<server>/api/v1/<segments...>`, percent-encoding each segment
    pub fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.server_url().clone();
        url.path_segments_mut()
            .map_err(|()| Error::config("Server URL cannot be a base"))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&mut self, url: Url) -> Result<T> {
        self.connection.execute(ApiRequest::get(url)).await?.json()
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &mut self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.connection
            .execute(ApiRequest::new(method, url).json(body))
            .await?
            .json()
    }

    async fn list<T: DeserializeOwned>(&mut self, url: Url) -> Result<Vec<T>> {
        fetch_all(self.connection.as_mut(), url).await
    }

    /// Lazily walk the pages of any listing endpoint
    pub fn paged<T: DeserializeOwned>(&mut self, url: Url) -> PagedResult<'_, T> {
        PagedResult::new(self.connection.as_mut(), url)
    }

    // ========================================================================
    // Server and accounts
    // ========================================================================

    /// Server version
    pub async fn fetch_version(&mut self) -> Result<ServerVersion> {
        let url = self.api_url(&["version"])?;
        self.get(url).await
    }

    /// The authenticated user
    pub async fn fetch_current_user(&mut self) -> Result<User> {
        let url = self.api_url(&["user"])?;
        self.get(url).await
    }

    /// A user by login
    pub async fn fetch_user(&mut self, name: &str) -> Result<User> {
        let url = self.api_url(&["users", name])?;
        self.get(url).await
    }

    /// An organization by name
    pub async fn fetch_organization(&mut self, name: &str) -> Result<Organization> {
        let url = self.api_url(&["orgs", name])?;
        self.get(url).await
    }

    /// An organization, or the user of that name when no organization exists
    pub async fn fetch_owner(&mut self, name: &str) -> Result<Owner> {
        match self.fetch_organization(name).await {
            Ok(org) => Ok(Owner::Organization(org)),
            Err(e) if e.is_not_found() => {
                debug!("No organization '{}', looking up user", name);
                Ok(Owner::User(self.fetch_user(name).await?))
            }
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // Repositories
    // ========================================================================

    /// Every repository of an owner
    pub async fn fetch_repositories(&mut self, owner: &Owner) -> Result<Vec<Repository>> {
        let kind = if owner.is_organization() { "orgs" } else { "users" };
        let url = self.api_url(&[kind, owner.name(), "repos"])?;
        self.list(url).await
    }

    /// Every repository the authenticated user can access
    pub async fn fetch_current_user_repositories(&mut self) -> Result<Vec<Repository>> {
        let url = self.api_url(&["user", "repos"])?;
        self.list(url).await
    }

    /// One repository
    pub async fn fetch_repository(&mut self, owner: &str, repo: &str) -> Result<Repository> {
        let url = self.api_url(&["repos", owner, repo])?;
        self.get(url).await
    }

    // ========================================================================
    // Branches, tags and commits
    // ========================================================================

    /// Every branch of a repository
    pub async fn fetch_branches(&mut self, owner: &str, repo: &str) -> Result<Vec<Branch>> {
        let url = self.api_url(&["repos", owner, repo, "branches"])?;
        self.list(url).await
    }

    /// One branch
    pub async fn fetch_branch(&mut self, owner: &str, repo: &str, branch: &str) -> Result<Branch> {
        let url = self.api_url(&["repos", owner, repo, "branches", branch])?;
        self.get(url).await
    }

    /// Every tag of a repository
    pub async fn fetch_tags(&mut self, owner: &str, repo: &str) -> Result<Vec<Tag>> {
        let url = self.api_url(&["repos", owner, repo, "tags"])?;
        self.list(url).await
    }

    /// One tag
    pub async fn fetch_tag(&mut self, owner: &str, repo: &str, tag: &str) -> Result<Tag> {
        let url = self.api_url(&["repos", owner, repo, "tags", tag])?;
        self.get(url).await
    }

    /// One commit
    pub async fn fetch_commit(&mut self, owner: &str, repo: &str, sha: &str) -> Result<Commit> {
        let url = self.api_url(&["repos", owner, repo, "git", "commits", sha])?;
        self.get(url).await
    }

    // ========================================================================
    // Pull requests and issues
    // ========================================================================

    /// Pull requests in the given state; empty when pull requests are disabled
    pub async fn fetch_pull_requests(
        &mut self,
        owner: &str,
        repo: &str,
        state: StateFilter,
    ) -> Result<Vec<PullRequest>> {
        let mut url = self.api_url(&["repos", owner, repo, "pulls"])?;
        url.query_pairs_mut().append_pair("state", state.as_str());
        empty_if_not_found(self.list(url).await, "pull requests", owner, repo)
    }

    /// One pull request
    pub async fn fetch_pull_request(
        &mut self,
        owner: &str,
        repo: &str,
        number: i64,
    ) -> Result<PullRequest> {
        let number = number.to_string();
        let url = self.api_url(&["repos", owner, repo, "pulls", &number])?;
        self.get(url).await
    }

    /// Issues (not pull requests) in the given state; empty when the tracker is disabled
    pub async fn fetch_issues(
        &mut self,
        owner: &str,
        repo: &str,
        state: StateFilter,
    ) -> Result<Vec<Issue>> {
        let mut url = self.api_url(&["repos", owner, repo, "issues"])?;
        url.query_pairs_mut()
            .append_pair("state", state.as_str())
            .append_pair("type", "issues");
        empty_if_not_found(self.list(url).await, "issues", owner, repo)
    }

    /// One issue
    pub async fn fetch_issue(&mut self, owner: &str, repo: &str, number: i64) -> Result<Issue> {
        let number = number.to_string();
        let url = self.api_url(&["repos", owner, repo, "issues", &number])?;
        self.get(url).await
    }

    // ========================================================================
    // Webhooks
    // ========================================================================

    /// Every webhook in the scope
    pub async fn fetch_hooks(&mut self, scope: HookScope<'_>) -> Result<Vec<Hook>> {
        let url = self.api_url(&scope.segments())?;
        self.list(url).await
    }

    /// Create a webhook
    pub async fn create_hook(
        &mut self,
        scope: HookScope<'_>,
        hook: &CreateHookOption,
    ) -> Result<Hook> {
        let url = self.api_url(&scope.segments())?;
        self.send_json(Method::POST, url, hook).await
    }

    /// Update a webhook
    pub async fn update_hook(
        &mut self,
        scope: HookScope<'_>,
        id: i64,
        changes: &EditHookOption,
    ) -> Result<Hook> {
        let id = id.to_string();
        let mut segments = scope.segments();
        segments.push(&id);
        let url = self.api_url(&segments)?;
        self.send_json(Method::PATCH, url, changes).await
    }

    /// Delete a webhook
    pub async fn delete_hook(&mut self, scope: HookScope<'_>, id: i64) -> Result<()> {
        let id = id.to_string();
        let mut segments = scope.segments();
        segments.push(&id);
        let url = self.api_url(&segments)?;
        self.connection.execute(ApiRequest::delete(url)).await?;
        Ok(())
    }

    // ========================================================================
    // Commit statuses, collaborators, releases, contents
    // ========================================================================

    /// Attach a status to a commit
    pub async fn create_commit_status(
        &mut self,
        owner: &str,
        repo: &str,
        sha: &str,
        status: &CreateStatusOption,
    ) -> Result<CommitStatus> {
        let url = self.api_url(&["repos", owner, repo, "statuses", sha])?;
        self.send_json(Method::POST, url, status).await
    }

    /// Every status of a commit or ref
    pub async fn fetch_commit_statuses(
        &mut self,
        owner: &str,
        repo: &str,
        git_ref: &str,
    ) -> Result<Vec<CommitStatus>> {
        let url = self.api_url(&["repos", owner, repo, "commits", git_ref, "statuses"])?;
        self.list(url).await
    }

    /// Check whether `user` collaborates on the repository
    pub async fn check_collaborator(&mut self, owner: &str, repo: &str, user: &str) -> Result<bool> {
        let url = self.api_url(&["repos", owner, repo, "collaborators", user])?;
        exists(self.connection.execute(ApiRequest::get(url)).await)
    }

    /// Every release of a repository
    pub async fn fetch_releases(&mut self, owner: &str, repo: &str) -> Result<Vec<Release>> {
        let url = self.api_url(&["repos", owner, repo, "releases"])?;
        self.list(url).await
    }

    /// Create a release
    pub async fn create_release(
        &mut self,
        owner: &str,
        repo: &str,
        release: &CreateReleaseOption,
    ) -> Result<Release> {
        let url = self.api_url(&["repos", owner, repo, "releases"])?;
        self.send_json(Method::POST, url, release).await
    }

    /// Check whether `path` exists at `git_ref`
    pub async fn check_file_exists(
        &mut self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        path: &str,
    ) -> Result<bool> {
        let mut segments = vec!["repos", owner, repo, "contents"];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        let mut url = self.api_url(&segments)?;
        url.query_pairs_mut().append_pair("ref", git_ref);
        exists(self.connection.execute(ApiRequest::get(url)).await)
    }
}

impl std::fmt::Debug for GiteaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GiteaClient")
            .field("server_url", &self.server_url().as_str())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A disabled feature answers 404; report it as nothing to list
fn empty_if_not_found<T>(
    result: Result<Vec<T>>,
    what: &str,
    owner: &str,
    repo: &str,
) -> Result<Vec<T>> {
    match result {
        Err(e) if e.is_not_found() => {
            debug!("No {} endpoint for {}/{}, treating as empty", what, owner, repo);
            Ok(Vec::new())
        }
        other => other,
    }
}

fn exists<T>(result: Result<T>) -> Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Open a client, run `f`, and close the client on every exit path
///
/// ```rust,ignore
/// let version = with_client(registry, &request, |client| {
///     Box::pin(async move { client.fetch_version().await })
/// })
/// .await?;
/// ```
pub async fn with_client<T, F>(
    registry: &BackendRegistry,
    request: &ConnectionRequest,
    f: F,
) -> Result<T>
where
    F: for<'a> FnOnce(&'a mut GiteaClient) -> BoxFuture<'a, Result<T>>,
{
    let mut client = GiteaClient::open(registry, request).await?;
    let result = f(&mut client).await;
    let closed = client.close().await;
    let value = result?;
    closed?;
    Ok(value)
}
