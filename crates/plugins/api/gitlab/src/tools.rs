//! GitLab tool table.

use std::fmt;

use dsw_core::args::{self, page_or_default, path_segment};
use dsw_core::tool::{narrow, narrow_list};
use dsw_core::{Adapter, AdapterKind, Result, ToolSpec, UpstreamRequest};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::types::{
    CreateIssueRequest, CreateMergeRequestRequest, CreateNoteRequest, GitLabIssue,
    GitLabMergeRequest, GitLabNote, GitLabProject, IssueSummary, MergeRequestSummary,
    NoteSummary, ProjectSummary, UpdateIssueRequest,
};

const DEFAULT_PER_PAGE: u32 = 30;
const DEFAULT_STATE: &str = "opened";

pub fn adapter() -> Adapter {
    Adapter::new(
        AdapterKind::GitLab,
        vec![
            ToolSpec::new(
                "gitlab_create_issue",
                "Create a new issue in a GitLab project",
                json!({
                    "type": "object",
                    "properties": {
                        "project_id": project_id_schema(),
                        "title": { "type": "string", "minLength": 1 },
                        "description": { "type": "string" },
                        "labels": { "type": "array", "items": { "type": "string" } },
                        "assignee_ids": { "type": "array", "items": { "type": "integer" } }
                    },
                    "required": ["project_id", "title"]
                }),
                "issue",
                create_issue,
                narrow::<GitLabIssue, IssueSummary>,
            ),
            ToolSpec::new(
                "gitlab_list_issues",
                "List issues in a GitLab project",
                json!({
                    "type": "object",
                    "properties": {
                        "project_id": project_id_schema(),
                        "state": { "type": "string", "enum": ["opened", "closed", "all"], "description": "Issue state (default: opened)" },
                        "labels": { "type": "string", "description": "Comma-separated label names" },
                        "page": { "type": "integer", "minimum": 1 },
                        "per_page": { "type": "integer", "minimum": 1, "maximum": 100 }
                    },
                    "required": ["project_id"]
                }),
                "issues",
                list_issues,
                narrow_list::<GitLabIssue, IssueSummary>,
            ),
            ToolSpec::new(
                "gitlab_update_issue",
                "Update an issue; use state_event to close or reopen it",
                json!({
                    "type": "object",
                    "properties": {
                        "project_id": project_id_schema(),
                        "issue_iid": { "type": "integer", "minimum": 1 },
                        "title": { "type": "string", "minLength": 1 },
                        "description": { "type": "string" },
                        "state_event": { "type": "string", "enum": ["close", "reopen"] },
                        "labels": { "type": "array", "items": { "type": "string" } },
                        "assignee_ids": { "type": "array", "items": { "type": "integer" } }
                    },
                    "required": ["project_id", "issue_iid"]
                }),
                "issue",
                update_issue,
                narrow::<GitLabIssue, IssueSummary>,
            ),
            ToolSpec::new(
                "gitlab_add_issue_note",
                "Add a comment to an issue",
                json!({
                    "type": "object",
                    "properties": {
                        "project_id": project_id_schema(),
                        "issue_iid": { "type": "integer", "minimum": 1 },
                        "body": { "type": "string", "minLength": 1 }
                    },
                    "required": ["project_id", "issue_iid", "body"]
                }),
                "note",
                add_issue_note,
                narrow::<GitLabNote, NoteSummary>,
            ),
            ToolSpec::new(
                "gitlab_create_merge_request",
                "Open a merge request from source_branch into target_branch",
                json!({
                    "type": "object",
                    "properties": {
                        "project_id": project_id_schema(),
                        "source_branch": { "type": "string", "minLength": 1 },
                        "target_branch": { "type": "string", "minLength": 1 },
                        "title": { "type": "string", "minLength": 1 },
                        "description": { "type": "string" },
                        "remove_source_branch": { "type": "boolean" }
                    },
                    "required": ["project_id", "source_branch", "target_branch", "title"]
                }),
                "merge_request",
                create_merge_request,
                narrow::<GitLabMergeRequest, MergeRequestSummary>,
            ),
            ToolSpec::new(
                "gitlab_list_merge_requests",
                "List merge requests in a GitLab project",
                json!({
                    "type": "object",
                    "properties": {
                        "project_id": project_id_schema(),
                        "state": { "type": "string", "enum": ["opened", "closed", "merged", "locked", "all"] },
                        "page": { "type": "integer", "minimum": 1 },
                        "per_page": { "type": "integer", "minimum": 1, "maximum": 100 }
                    },
                    "required": ["project_id"]
                }),
                "merge_requests",
                list_merge_requests,
                narrow_list::<GitLabMergeRequest, MergeRequestSummary>,
            ),
            ToolSpec::new(
                "gitlab_list_projects",
                "List projects the token's user is a member of",
                json!({
                    "type": "object",
                    "properties": {
                        "search": { "type": "string" },
                        "page": { "type": "integer", "minimum": 1 },
                        "per_page": { "type": "integer", "minimum": 1, "maximum": 100 }
                    }
                }),
                "projects",
                list_projects,
                narrow_list::<GitLabProject, ProjectSummary>,
            ),
        ],
    )
}

fn project_id_schema() -> Value {
    json!({
        "type": ["string", "integer"],
        "minLength": 1,
        "description": "Numeric project id or full path (group/project)"
    })
}

/// Numeric id or `group/project` path.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProjectId {
    Id(u64),
    Path(String),
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectId::Id(id) => write!(f, "{}", id),
            ProjectId::Path(path) => f.write_str(&path_segment(path)),
        }
    }
}

fn project_path(project: &ProjectId, rest: &str) -> String {
    format!("/api/v4/projects/{}{}", project, rest)
}

/// GitLab takes labels as one comma-separated string.
fn join_labels(labels: Option<Vec<String>>) -> Option<String> {
    labels.map(|labels| labels.join(","))
}

// =============================================================================
// Parameters
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateIssueParams {
    project_id: ProjectId,
    title: String,
    description: Option<String>,
    labels: Option<Vec<String>>,
    assignee_ids: Option<Vec<u64>>,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    project_id: ProjectId,
    state: Option<String>,
    labels: Option<String>,
    page: Option<u32>,
    per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct UpdateIssueParams {
    project_id: ProjectId,
    issue_iid: u64,
    title: Option<String>,
    description: Option<String>,
    state_event: Option<String>,
    labels: Option<Vec<String>>,
    assignee_ids: Option<Vec<u64>>,
}

#[derive(Debug, Deserialize)]
struct AddNoteParams {
    project_id: ProjectId,
    issue_iid: u64,
    body: String,
}

#[derive(Debug, Deserialize)]
struct CreateMergeRequestParams {
    project_id: ProjectId,
    source_branch: String,
    target_branch: String,
    title: String,
    description: Option<String>,
    remove_source_branch: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ListProjectsParams {
    search: Option<String>,
    page: Option<u32>,
    per_page: Option<u32>,
}

// =============================================================================
// Request mappers
// =============================================================================

fn create_issue(arguments: &Value) -> Result<UpstreamRequest> {
    let params: CreateIssueParams = args::parse(arguments)?;
    let body = CreateIssueRequest {
        title: params.title,
        description: params.description,
        labels: join_labels(params.labels),
        assignee_ids: params.assignee_ids,
    };
    Ok(UpstreamRequest::post(project_path(&params.project_id, "/issues"))
        .json(serde_json::to_value(body)?))
}

fn list_issues(arguments: &Value) -> Result<UpstreamRequest> {
    let params: ListParams = args::parse(arguments)?;
    Ok(UpstreamRequest::get(project_path(&params.project_id, "/issues"))
        .query("state", params.state.as_deref().unwrap_or(DEFAULT_STATE))
        .query_opt("labels", params.labels)
        .query("page", page_or_default(params.page))
        .query("per_page", params.per_page.unwrap_or(DEFAULT_PER_PAGE)))
}

fn update_issue(arguments: &Value) -> Result<UpstreamRequest> {
    let params: UpdateIssueParams = args::parse(arguments)?;
    let body = UpdateIssueRequest {
        title: params.title,
        description: params.description,
        state_event: params.state_event,
        labels: join_labels(params.labels),
        assignee_ids: params.assignee_ids,
    };
    Ok(UpstreamRequest::put(project_path(
        &params.project_id,
        &format!("/issues/{}", params.issue_iid),
    ))
    .json(serde_json::to_value(body)?))
}

fn add_issue_note(arguments: &Value) -> Result<UpstreamRequest> {
    let params: AddNoteParams = args::parse(arguments)?;
    let body = CreateNoteRequest { body: params.body };
    Ok(UpstreamRequest::post(project_path(
        &params.project_id,
        &format!("/issues/{}/notes", params.issue_iid),
    ))
    .json(serde_json::to_value(body)?))
}

fn create_merge_request(arguments: &Value) -> Result<UpstreamRequest> {
    let params: CreateMergeRequestParams = args::parse(arguments)?;
    let body = CreateMergeRequestRequest {
        source_branch: params.source_branch,
        target_branch: params.target_branch,
        title: params.title,
        description: params.description,
        remove_source_branch: params.remove_source_branch,
    };
    Ok(
        UpstreamRequest::post(project_path(&params.project_id, "/merge_requests"))
            .json(serde_json::to_value(body)?),
    )
}

fn list_merge_requests(arguments: &Value) -> Result<UpstreamRequest> {
    let params: ListParams = args::parse(arguments)?;
    Ok(
        UpstreamRequest::get(project_path(&params.project_id, "/merge_requests"))
            .query("state", params.state.as_deref().unwrap_or(DEFAULT_STATE))
            .query("page", page_or_default(params.page))
            .query("per_page", params.per_page.unwrap_or(DEFAULT_PER_PAGE)),
    )
}

fn list_projects(arguments: &Value) -> Result<UpstreamRequest> {
    let params: ListProjectsParams = args::parse(arguments)?;
    Ok(UpstreamRequest::get("/api/v4/projects")
        .query("membership", true)
        .query_opt("search", params.search)
        .query("page", page_or_default(params.page))
        .query("per_page", params.per_page.unwrap_or(DEFAULT_PER_PAGE)))
}
