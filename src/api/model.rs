//! Gitea API payloads
//!
//! Only the fields this client reads are modelled; unknown fields are
//! ignored and missing ones fall back to their defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `GET /version`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerVersion {
    pub version: String,
}

/// A user account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub full_name: String,
    pub email: String,
    pub avatar_url: String,
}

/// An organization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub description: String,
    pub avatar_url: String,
    pub website: String,
}

/// Either kind of repository owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Owner {
    User(User),
    Organization(Organization),
}

impl Owner {
    /// Login name of the owner
    pub fn name(&self) -> &str {
        match self {
            Owner::User(user) => &user.login,
            Owner::Organization(org) => &org.username,
        }
    }

    /// Check if the owner is an organization
    pub fn is_organization(&self) -> bool {
        matches!(self, Owner::Organization(_))
    }
}

/// Permissions of the authenticated user on a repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Permissions {
    pub admin: bool,
    pub push: bool,
    pub pull: bool,
}

/// A repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub id: i64,
    pub owner: User,
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub empty: bool,
    pub private: bool,
    pub fork: bool,
    pub mirror: bool,
    pub archived: bool,
    pub html_url: String,
    pub ssh_url: String,
    pub clone_url: String,
    pub website: String,
    pub default_branch: String,
    pub has_issues: bool,
    pub has_pull_requests: bool,
    pub has_wiki: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub permissions: Option<Permissions>,
}

/// Commit summary embedded in branch payloads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadCommit {
    pub id: String,
    pub message: String,
    pub url: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// A branch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branch {
    pub name: String,
    pub commit: PayloadCommit,
    pub protected: bool,
}

/// Commit reference embedded in tag payloads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitMeta {
    pub sha: String,
    pub url: String,
}

/// A tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub name: String,
    pub id: String,
    pub message: String,
    pub commit: CommitMeta,
    pub zipball_url: String,
    pub tarball_url: String,
}

/// Git-level commit details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoCommit {
    pub message: String,
    pub url: String,
}

/// A commit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Commit {
    pub sha: String,
    pub url: String,
    pub html_url: String,
    pub commit: RepoCommit,
    pub author: Option<User>,
    pub committer: Option<User>,
}

/// A label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    pub id: i64,
    pub name: String,
    pub color: String,
}

/// Head or base of a pull request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullRequestBranch {
    pub label: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub sha: String,
    pub repo_id: i64,
    pub repo: Option<Repository>,
}

/// A pull request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullRequest {
    pub id: i64,
    pub number: i64,
    pub user: User,
    pub title: String,
    pub body: String,
    pub state: String,
    pub labels: Vec<Label>,
    pub html_url: String,
    pub diff_url: String,
    pub patch_url: String,
    pub mergeable: bool,
    pub merged: bool,
    pub merged_at: Option<DateTime<Utc>>,
    pub head: PullRequestBranch,
    pub base: PullRequestBranch,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// An issue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
    pub id: i64,
    pub number: i64,
    pub user: User,
    pub title: String,
    pub body: String,
    pub state: String,
    pub labels: Vec<Label>,
    pub html_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A webhook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hook {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub config: HashMap<String, String>,
    pub events: Vec<String>,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of a webhook creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateHookOption {
    #[serde(rename = "type")]
    pub kind: String,
    pub config: HashMap<String, String>,
    pub events: Vec<String>,
    pub active: bool,
}

impl CreateHookOption {
    /// Active Gitea-type hook posting JSON to `url` for the given events
    pub fn gitea(url: impl Into<String>, events: Vec<String>) -> Self {
        let mut config = HashMap::new();
        config.insert("url".to_string(), url.into());
        config.insert("content_type".to_string(), "json".to_string());
        Self {
            kind: "gitea".to_string(),
            config,
            events,
            active: true,
        }
    }
}

/// Body of a webhook update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditHookOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// State of a commit status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStatusState {
    #[default]
    Pending,
    Success,
    Error,
    Failure,
    Warning,
}

/// A commit status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitStatus {
    pub id: i64,
    #[serde(alias = "status")]
    pub state: CommitStatusState,
    pub target_url: String,
    pub description: String,
    pub context: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of a commit status creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateStatusOption {
    pub state: CommitStatusState,
    pub target_url: String,
    pub description: String,
    pub context: String,
}

/// A release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Release {
    pub id: i64,
    pub tag_name: String,
    pub target_commitish: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
    pub url: String,
    pub html_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Body of a release creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateReleaseOption {
    pub tag_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_commitish: Option<String>,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}
