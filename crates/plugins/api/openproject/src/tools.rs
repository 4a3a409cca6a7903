//! OpenProject tool table.

use std::fmt;

use dsw_core::args::{self, page_or_default, path_segment};
use dsw_core::tool::{from_upstream, narrow};
use dsw_core::{Adapter, AdapterKind, Result, ToolSpec, UpstreamRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::{
    CreateWorkPackageRequest, Formattable, HalCollection, LinkRef, OpenProjectProject,
    OpenProjectWorkPackage, ProjectDetail, ProjectSummary, UpdateWorkPackageRequest,
    WorkPackageDetail, WorkPackageLinksRequest, WorkPackageSummary,
};

const API_PREFIX: &str = "/api/v3";
const DEFAULT_PAGE_SIZE: u32 = 20;

pub fn adapter() -> Adapter {
    Adapter::new(
        AdapterKind::OpenProject,
        vec![
            ToolSpec::new(
                "openproject_list_projects",
                "List projects visible to the API key",
                json!({
                    "type": "object",
                    "properties": {
                        "page": { "type": "integer", "minimum": 1 },
                        "page_size": { "type": "integer", "minimum": 1, "maximum": 100, "description": "Results per page (default: 20)" }
                    }
                }),
                "projects",
                list_projects,
                narrow_collection::<OpenProjectProject, ProjectSummary>,
            ),
            ToolSpec::new(
                "openproject_get_project",
                "Get a project by id or identifier",
                json!({
                    "type": "object",
                    "properties": {
                        "project_id": project_id_schema()
                    },
                    "required": ["project_id"]
                }),
                "project",
                get_project,
                narrow::<OpenProjectProject, ProjectDetail>,
            ),
            ToolSpec::new(
                "openproject_create_work_package",
                "Create a work package in a project",
                json!({
                    "type": "object",
                    "properties": {
                        "project_id": project_id_schema(),
                        "subject": { "type": "string", "minLength": 1 },
                        "description": { "type": "string", "description": "Markdown description" },
                        "type_id": { "type": "integer", "minimum": 1, "description": "Work package type (e.g. Task, Bug)" },
                        "status_id": { "type": "integer", "minimum": 1 }
                    },
                    "required": ["project_id", "subject"]
                }),
                "work_package",
                create_work_package,
                narrow::<OpenProjectWorkPackage, WorkPackageSummary>,
            ),
            ToolSpec::new(
                "openproject_get_work_package",
                "Get a work package, including the lock_version needed to update it",
                json!({
                    "type": "object",
                    "properties": {
                        "work_package_id": { "type": "integer", "minimum": 1 }
                    },
                    "required": ["work_package_id"]
                }),
                "work_package",
                get_work_package,
                narrow::<OpenProjectWorkPackage, WorkPackageDetail>,
            ),
            ToolSpec::new(
                "openproject_list_work_packages",
                "List work packages in a project",
                json!({
                    "type": "object",
                    "properties": {
                        "project_id": project_id_schema(),
                        "page": { "type": "integer", "minimum": 1 },
                        "page_size": { "type": "integer", "minimum": 1, "maximum": 100 }
                    },
                    "required": ["project_id"]
                }),
                "work_packages",
                list_work_packages,
                narrow_collection::<OpenProjectWorkPackage, WorkPackageSummary>,
            ),
            ToolSpec::new(
                "openproject_update_work_package",
                "Update a work package; lock_version must match the current one",
                json!({
                    "type": "object",
                    "properties": {
                        "work_package_id": { "type": "integer", "minimum": 1 },
                        "lock_version": { "type": "integer", "minimum": 0 },
                        "subject": { "type": "string", "minLength": 1 },
                        "description": { "type": "string" },
                        "status_id": { "type": "integer", "minimum": 1 }
                    },
                    "required": ["work_package_id", "lock_version"]
                }),
                "work_package",
                update_work_package,
                narrow::<OpenProjectWorkPackage, WorkPackageSummary>,
            ),
        ],
    )
}

fn project_id_schema() -> Value {
    json!({
        "type": ["string", "integer"],
        "minLength": 1,
        "description": "Numeric project id or project identifier"
    })
}

/// Numeric id or textual identifier; both address the same resource.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProjectRef {
    Id(u64),
    Identifier(String),
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectRef::Id(id) => write!(f, "{}", id),
            ProjectRef::Identifier(identifier) => f.write_str(&path_segment(identifier)),
        }
    }
}

/// Map the elements of a HAL collection through the whitelist type `U`.
fn narrow_collection<T, U>(body: Value) -> Result<Value>
where
    T: DeserializeOwned,
    U: From<T> + Serialize,
{
    let collection: HalCollection<T> = from_upstream(body)?;
    let items: Vec<U> = collection
        .embedded
        .elements
        .into_iter()
        .map(U::from)
        .collect();
    Ok(serde_json::to_value(items)?)
}

// =============================================================================
// Parameters
// =============================================================================

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProjectParams {
    project_id: ProjectRef,
}

#[derive(Debug, Deserialize)]
struct ListWorkPackagesParams {
    project_id: ProjectRef,
    page: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CreateWorkPackageParams {
    project_id: ProjectRef,
    subject: String,
    description: Option<String>,
    type_id: Option<u64>,
    status_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WorkPackageParams {
    work_package_id: u64,
}

#[derive(Debug, Deserialize)]
struct UpdateWorkPackageParams {
    work_package_id: u64,
    lock_version: u64,
    subject: Option<String>,
    description: Option<String>,
    status_id: Option<u64>,
}

// =============================================================================
// Request mappers
// =============================================================================

/// OpenProject pages with `offset` (1-based page number) and `pageSize`.
fn paged(request: UpstreamRequest, page: Option<u32>, page_size: Option<u32>) -> UpstreamRequest {
    request
        .query("offset", page_or_default(page))
        .query("pageSize", page_size.unwrap_or(DEFAULT_PAGE_SIZE))
}

fn list_projects(arguments: &Value) -> Result<UpstreamRequest> {
    let params: PageParams = args::parse(arguments)?;
    Ok(paged(
        UpstreamRequest::get(format!("{}/projects", API_PREFIX)),
        params.page,
        params.page_size,
    ))
}

fn get_project(arguments: &Value) -> Result<UpstreamRequest> {
    let params: ProjectParams = args::parse(arguments)?;
    Ok(UpstreamRequest::get(format!(
        "{}/projects/{}",
        API_PREFIX, params.project_id
    )))
}

fn create_work_package(arguments: &Value) -> Result<UpstreamRequest> {
    let params: CreateWorkPackageParams = args::parse(arguments)?;
    let body = CreateWorkPackageRequest {
        subject: params.subject,
        description: params.description.map(Formattable::markdown),
        links: WorkPackageLinksRequest {
            status: params.status_id.map(LinkRef::status),
            type_link: params.type_id.map(LinkRef::work_package_type),
        },
    };
    Ok(UpstreamRequest::post(format!(
        "{}/projects/{}/work_packages",
        API_PREFIX, params.project_id
    ))
    .json(serde_json::to_value(body)?))
}

fn get_work_package(arguments: &Value) -> Result<UpstreamRequest> {
    let params: WorkPackageParams = args::parse(arguments)?;
    Ok(UpstreamRequest::get(format!(
        "{}/work_packages/{}",
        API_PREFIX, params.work_package_id
    )))
}

fn list_work_packages(arguments: &Value) -> Result<UpstreamRequest> {
    let params: ListWorkPackagesParams = args::parse(arguments)?;
    Ok(paged(
        UpstreamRequest::get(format!(
            "{}/projects/{}/work_packages",
            API_PREFIX, params.project_id
        )),
        params.page,
        params.page_size,
    ))
}

fn update_work_package(arguments: &Value) -> Result<UpstreamRequest> {
    let params: UpdateWorkPackageParams = args::parse(arguments)?;
    let body = UpdateWorkPackageRequest {
        lock_version: params.lock_version,
        subject: params.subject,
        description: params.description.map(Formattable::markdown),
        links: WorkPackageLinksRequest {
            status: params.status_id.map(LinkRef::status),
            type_link: None,
        },
    };
    Ok(UpstreamRequest::patch(format!(
        "{}/work_packages/{}",
        API_PREFIX, params.work_package_id
    ))
    .json(serde_json::to_value(body)?))
}
