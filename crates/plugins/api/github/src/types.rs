//! GitHub API types.
//!
//! Upstream responses are deserialized into the `GitHub*` types, then mapped
//! onto the `*Summary` types that the gateway returns. Only the summary
//! fields ever leave the adapter.

use serde::{Deserialize, Serialize};

// =============================================================================
// Upstream responses
// =============================================================================

/// GitHub user representation.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

/// GitHub label representation.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubLabel {
    pub name: String,
}

/// GitHub issue representation.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubIssue {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub assignees: Vec<GitHubUser>,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// PRs are also returned by /issues endpoint, this field distinguishes them
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

/// GitHub pull request representation.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubPullRequest {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: String,
    #[serde(default)]
    pub draft: bool,
    pub head: GitHubBranchRef,
    pub base: GitHubBranchRef,
}

/// GitHub branch reference.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubBranchRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
}

/// GitHub issue/PR comment.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubComment {
    pub id: u64,
    pub body: String,
    pub html_url: String,
}

/// GitHub repository representation.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepository {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
}

// =============================================================================
// Normalized entities
// =============================================================================

/// Issue as returned by create/update/list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueSummary {
    pub number: u64,
    pub url: String,
    pub title: String,
    pub state: String,
}

/// Issue with body and people, returned by `github_get_issue`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueDetail {
    pub number: u64,
    pub url: String,
    pub title: String,
    pub state: String,
    pub body: Option<String>,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentSummary {
    pub id: u64,
    pub url: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullRequestSummary {
    pub number: u64,
    pub url: String,
    pub title: String,
    pub state: String,
    pub draft: bool,
    pub head: String,
    pub base: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositorySummary {
    pub name: String,
    pub full_name: String,
    pub url: String,
    pub description: Option<String>,
    pub default_branch: Option<String>,
    pub stars: u64,
    pub open_issues: u64,
}

impl From<GitHubIssue> for IssueSummary {
    fn from(issue: GitHubIssue) -> Self {
        Self {
            number: issue.number,
            url: issue.html_url,
            title: issue.title,
            state: issue.state,
        }
    }
}

impl From<GitHubIssue> for IssueDetail {
    fn from(issue: GitHubIssue) -> Self {
        Self {
            number: issue.number,
            url: issue.html_url,
            title: issue.title,
            state: issue.state,
            body: issue.body,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            assignees: issue.assignees.into_iter().map(|u| u.login).collect(),
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        }
    }
}

impl From<GitHubComment> for CommentSummary {
    fn from(comment: GitHubComment) -> Self {
        Self {
            id: comment.id,
            url: comment.html_url,
            body: comment.body,
        }
    }
}

impl From<GitHubPullRequest> for PullRequestSummary {
    fn from(pr: GitHubPullRequest) -> Self {
        Self {
            number: pr.number,
            url: pr.html_url,
            title: pr.title,
            state: pr.state,
            draft: pr.draft,
            head: pr.head.ref_name,
            base: pr.base.ref_name,
        }
    }
}

impl From<GitHubRepository> for RepositorySummary {
    fn from(repo: GitHubRepository) -> Self {
        Self {
            name: repo.name,
            full_name: repo.full_name,
            url: repo.html_url,
            description: repo.description,
            default_branch: repo.default_branch,
            stars: repo.stargazers_count,
            open_issues: repo.open_issues_count,
        }
    }
}

// =============================================================================
// Create/Update types
// =============================================================================

/// Request body for creating an issue.
#[derive(Debug, Clone, Serialize)]
pub struct CreateIssueRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
}

/// Request body for updating an issue.
#[derive(Debug, Clone, Serialize, Default)]
pub struct UpdateIssueRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
}

/// Request body for creating a comment.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCommentRequest {
    pub body: String,
}

/// Request body for opening a pull request.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePullRequestRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub draft: bool,
}
