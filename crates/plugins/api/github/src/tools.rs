//! GitHub tool table.

use dsw_core::args::{self, page_or_default, split_repository};
use dsw_core::tool::{from_upstream, narrow, narrow_list};
use dsw_core::{Adapter, AdapterKind, Result, ToolSpec, UpstreamRequest};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::types::{
    CommentSummary, CreateCommentRequest, CreateIssueRequest, CreatePullRequestRequest, GitHubComment,
    GitHubIssue, GitHubPullRequest, GitHubRepository, IssueDetail, IssueSummary,
    PullRequestSummary, RepositorySummary, UpdateIssueRequest,
};

const DEFAULT_PER_PAGE: u32 = 30;

/// All GitHub tools, in the order `mcp.listTools` reports them.
pub fn adapter() -> Adapter {
    Adapter::new(
        AdapterKind::GitHub,
        vec![
            ToolSpec::new(
                "github_create_issue",
                "Create a new issue in a GitHub repository",
                json!({
                    "type": "object",
                    "properties": {
                        "repository": repository_schema(),
                        "title": { "type": "string", "minLength": 1, "description": "Issue title" },
                        "body": { "type": "string", "description": "Issue body (markdown)" },
                        "labels": { "type": "array", "items": { "type": "string" } },
                        "assignees": { "type": "array", "items": { "type": "string" } }
                    },
                    "required": ["repository", "title"]
                }),
                "issue",
                create_issue,
                narrow::<GitHubIssue, IssueSummary>,
            ),
            ToolSpec::new(
                "github_get_issue",
                "Get a single issue with its body, labels and assignees",
                json!({
                    "type": "object",
                    "properties": {
                        "repository": repository_schema(),
                        "issue_number": { "type": "integer", "minimum": 1 }
                    },
                    "required": ["repository", "issue_number"]
                }),
                "issue",
                get_issue,
                narrow::<GitHubIssue, IssueDetail>,
            ),
            ToolSpec::new(
                "github_list_issues",
                "List issues in a GitHub repository (pull requests excluded)",
                json!({
                    "type": "object",
                    "properties": {
                        "repository": repository_schema(),
                        "state": { "type": "string", "enum": ["open", "closed", "all"], "description": "Issue state (default: open)" },
                        "labels": { "type": "string", "description": "Comma-separated label names" },
                        "page": { "type": "integer", "minimum": 1, "description": "Page number (default: 1)" },
                        "per_page": { "type": "integer", "minimum": 1, "maximum": 100, "description": "Results per page (default: 30)" }
                    },
                    "required": ["repository"]
                }),
                "issues",
                list_issues,
                list_issues_response,
            ),
            ToolSpec::new(
                "github_update_issue",
                "Update the title, body, state, labels or assignees of an issue",
                json!({
                    "type": "object",
                    "properties": {
                        "repository": repository_schema(),
                        "issue_number": { "type": "integer", "minimum": 1 },
                        "title": { "type": "string", "minLength": 1 },
                        "body": { "type": "string" },
                        "state": { "type": "string", "enum": ["open", "closed"] },
                        "labels": { "type": "array", "items": { "type": "string" } },
                        "assignees": { "type": "array", "items": { "type": "string" } }
                    },
                    "required": ["repository", "issue_number"]
                }),
                "issue",
                update_issue,
                narrow::<GitHubIssue, IssueSummary>,
            ),
            ToolSpec::new(
                "github_add_comment",
                "Comment on an issue or pull request",
                json!({
                    "type": "object",
                    "properties": {
                        "repository": repository_schema(),
                        "issue_number": { "type": "integer", "minimum": 1 },
                        "body": { "type": "string", "minLength": 1 }
                    },
                    "required": ["repository", "issue_number", "body"]
                }),
                "comment",
                add_comment,
                narrow::<GitHubComment, CommentSummary>,
            ),
            ToolSpec::new(
                "github_list_pull_requests",
                "List pull requests in a GitHub repository",
                json!({
                    "type": "object",
                    "properties": {
                        "repository": repository_schema(),
                        "state": { "type": "string", "enum": ["open", "closed", "all"] },
                        "page": { "type": "integer", "minimum": 1 },
                        "per_page": { "type": "integer", "minimum": 1, "maximum": 100 }
                    },
                    "required": ["repository"]
                }),
                "pull_requests",
                list_pull_requests,
                narrow_list::<GitHubPullRequest, PullRequestSummary>,
            ),
            ToolSpec::new(
                "github_create_pull_request",
                "Open a pull request from head into base",
                json!({
                    "type": "object",
                    "properties": {
                        "repository": repository_schema(),
                        "title": { "type": "string", "minLength": 1 },
                        "head": { "type": "string", "minLength": 1, "description": "Branch with the changes" },
                        "base": { "type": "string", "minLength": 1, "description": "Branch to merge into" },
                        "body": { "type": "string" },
                        "draft": { "type": "boolean" }
                    },
                    "required": ["repository", "title", "head", "base"]
                }),
                "pull_request",
                create_pull_request,
                narrow::<GitHubPullRequest, PullRequestSummary>,
            ),
            ToolSpec::new(
                "github_get_repository",
                "Get repository metadata",
                json!({
                    "type": "object",
                    "properties": {
                        "repository": repository_schema()
                    },
                    "required": ["repository"]
                }),
                "repository",
                get_repository,
                narrow::<GitHubRepository, RepositorySummary>,
            ),
        ],
    )
}

fn repository_schema() -> Value {
    json!({
        "type": "string",
        "pattern": "^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$",
        "description": "Repository in owner/repo format"
    })
}

fn repo_path(repository: &str, rest: &str) -> Result<String> {
    let (owner, repo) = split_repository(repository)?;
    Ok(format!(
        "/repos/{}/{}{}",
        args::path_segment(owner),
        args::path_segment(repo),
        rest
    ))
}

// =============================================================================
// Parameters
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateIssueParams {
    repository: String,
    title: String,
    body: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    assignees: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct IssueRef {
    repository: String,
    issue_number: u64,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    repository: String,
    state: Option<String>,
    labels: Option<String>,
    page: Option<u32>,
    per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct UpdateIssueParams {
    repository: String,
    issue_number: u64,
    title: Option<String>,
    body: Option<String>,
    state: Option<String>,
    labels: Option<Vec<String>>,
    assignees: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct AddCommentParams {
    repository: String,
    issue_number: u64,
    body: String,
}

#[derive(Debug, Deserialize)]
struct CreatePullRequestParams {
    repository: String,
    title: String,
    head: String,
    base: String,
    body: Option<String>,
    #[serde(default)]
    draft: bool,
}

#[derive(Debug, Deserialize)]
struct RepositoryRef {
    repository: String,
}

// =============================================================================
// Request mappers
// =============================================================================

fn create_issue(arguments: &Value) -> Result<UpstreamRequest> {
    let params: CreateIssueParams = args::parse(arguments)?;
    let body = CreateIssueRequest {
        title: params.title,
        body: params.body,
        labels: params.labels,
        assignees: params.assignees,
    };
    Ok(UpstreamRequest::post(repo_path(&params.repository, "/issues")?)
        .json(serde_json::to_value(body)?))
}

fn get_issue(arguments: &Value) -> Result<UpstreamRequest> {
    let params: IssueRef = args::parse(arguments)?;
    Ok(UpstreamRequest::get(repo_path(
        &params.repository,
        &format!("/issues/{}", params.issue_number),
    )?))
}

fn list_issues(arguments: &Value) -> Result<UpstreamRequest> {
    let params: ListParams = args::parse(arguments)?;
    Ok(UpstreamRequest::get(repo_path(&params.repository, "/issues")?)
        .query("state", params.state.as_deref().unwrap_or("open"))
        .query_opt("labels", params.labels)
        .query("page", page_or_default(params.page))
        .query("per_page", params.per_page.unwrap_or(DEFAULT_PER_PAGE)))
}

fn update_issue(arguments: &Value) -> Result<UpstreamRequest> {
    let params: UpdateIssueParams = args::parse(arguments)?;
    let body = UpdateIssueRequest {
        title: params.title,
        body: params.body,
        state: params.state,
        labels: params.labels,
        assignees: params.assignees,
    };
    Ok(UpstreamRequest::patch(repo_path(
        &params.repository,
        &format!("/issues/{}", params.issue_number),
    )?)
    .json(serde_json::to_value(body)?))
}

fn add_comment(arguments: &Value) -> Result<UpstreamRequest> {
    let params: AddCommentParams = args::parse(arguments)?;
    let body = CreateCommentRequest { body: params.body };
    Ok(UpstreamRequest::post(repo_path(
        &params.repository,
        &format!("/issues/{}/comments", params.issue_number),
    )?)
    .json(serde_json::to_value(body)?))
}

fn list_pull_requests(arguments: &Value) -> Result<UpstreamRequest> {
    let params: ListParams = args::parse(arguments)?;
    Ok(UpstreamRequest::get(repo_path(&params.repository, "/pulls")?)
        .query("state", params.state.as_deref().unwrap_or("open"))
        .query("page", page_or_default(params.page))
        .query("per_page", params.per_page.unwrap_or(DEFAULT_PER_PAGE)))
}

fn create_pull_request(arguments: &Value) -> Result<UpstreamRequest> {
    let params: CreatePullRequestParams = args::parse(arguments)?;
    let body = CreatePullRequestRequest {
        title: params.title,
        head: params.head,
        base: params.base,
        body: params.body,
        draft: params.draft,
    };
    Ok(UpstreamRequest::post(repo_path(&params.repository, "/pulls")?)
        .json(serde_json::to_value(body)?))
}

fn get_repository(arguments: &Value) -> Result<UpstreamRequest> {
    let params: RepositoryRef = args::parse(arguments)?;
    Ok(UpstreamRequest::get(repo_path(&params.repository, "")?))
}

// =============================================================================
// Response mappers
// =============================================================================

/// The issues endpoint also returns pull requests; drop them.
fn list_issues_response(body: Value) -> Result<Value> {
    let issues: Vec<GitHubIssue> = from_upstream(body)?;
    let summaries: Vec<IssueSummary> = issues
        .into_iter()
        .filter(|issue| issue.pull_request.is_none())
        .map(IssueSummary::from)
        .collect();
    Ok(serde_json::to_value(summaries)?)
}
