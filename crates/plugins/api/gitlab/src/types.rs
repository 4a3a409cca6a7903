//! GitLab API response and request types.
//!
//! These types represent the raw JSON responses from GitLab REST API v4.
//! They are deserialized and then mapped onto the summary types the
//! gateway returns.

use serde::{Deserialize, Serialize};

// =============================================================================
// Upstream responses
// =============================================================================

/// GitLab user representation.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabUser {
    pub username: String,
}

/// GitLab issue representation.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabIssue {
    pub iid: u64,
    pub title: String,
    pub state: String,
    pub web_url: String,
}

/// GitLab note (comment) representation.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabNote {
    pub id: u64,
    pub body: String,
    #[serde(default)]
    pub author: Option<GitLabUser>,
}

/// GitLab merge request representation.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabMergeRequest {
    pub iid: u64,
    pub title: String,
    pub state: String,
    pub web_url: String,
    pub source_branch: String,
    pub target_branch: String,
}

/// GitLab project representation.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabProject {
    pub id: u64,
    pub name: String,
    pub path_with_namespace: String,
    pub web_url: String,
}

// =============================================================================
// Normalized entities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueSummary {
    pub iid: u64,
    pub url: String,
    pub title: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteSummary {
    pub id: u64,
    pub body: String,
    /// Username of the note author
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeRequestSummary {
    pub iid: u64,
    pub url: String,
    pub title: String,
    pub state: String,
    pub source_branch: String,
    pub target_branch: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub url: String,
}

impl From<GitLabIssue> for IssueSummary {
    fn from(issue: GitLabIssue) -> Self {
        Self {
            iid: issue.iid,
            url: issue.web_url,
            title: issue.title,
            state: issue.state,
        }
    }
}

impl From<GitLabNote> for NoteSummary {
    fn from(note: GitLabNote) -> Self {
        Self {
            id: note.id,
            body: note.body,
            author: note.author.map(|a| a.username),
        }
    }
}

impl From<GitLabMergeRequest> for MergeRequestSummary {
    fn from(mr: GitLabMergeRequest) -> Self {
        Self {
            iid: mr.iid,
            url: mr.web_url,
            title: mr.title,
            state: mr.state,
            source_branch: mr.source_branch,
            target_branch: mr.target_branch,
        }
    }
}

impl From<GitLabProject> for ProjectSummary {
    fn from(project: GitLabProject) -> Self {
        Self {
            id: project.id,
            name: project.name,
            path: project.path_with_namespace,
            url: project.web_url,
        }
    }
}

// =============================================================================
// Request types
// =============================================================================

/// Request body for creating an issue.
#[derive(Debug, Clone, Serialize)]
pub struct CreateIssueRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// GitLab expects comma-separated string for labels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<u64>>,
}

/// Request body for updating an issue.
#[derive(Debug, Clone, Serialize, Default)]
pub struct UpdateIssueRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// GitLab uses state_event: "close" or "reopen"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<u64>>,
}

/// Request body for creating a note (comment).
#[derive(Debug, Clone, Serialize)]
pub struct CreateNoteRequest {
    pub body: String,
}

/// Request body for opening a merge request.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMergeRequestRequest {
    pub source_branch: String,
    pub target_branch: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_source_branch: Option<bool>,
}
