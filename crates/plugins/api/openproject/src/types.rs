//! OpenProject API v3 types.

use serde::{Deserialize, Serialize};

// =============================================================================
// HAL building blocks
// =============================================================================

/// HAL collection: `{ "_embedded": { "elements": [...] }, "total": n }`.
#[derive(Debug, Clone, Deserialize)]
pub struct HalCollection<T> {
    #[serde(rename = "_embedded")]
    pub embedded: HalElements<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HalElements<T> {
    #[serde(default = "Vec::new")]
    pub elements: Vec<T>,
}

/// A HAL link. Resolved relations carry a `title`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HalLink {
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Formattable text (`{ "format": "markdown", "raw": "...", "html": "..." }`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Formattable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl Formattable {
    pub fn markdown(text: String) -> Self {
        Self { raw: Some(text) }
    }
}

// =============================================================================
// Upstream responses
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct OpenProjectProject {
    pub id: u64,
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<Formattable>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkPackageLinks {
    #[serde(rename = "self", default)]
    pub self_link: HalLink,
    #[serde(default)]
    pub status: HalLink,
    #[serde(rename = "type", default)]
    pub type_link: HalLink,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenProjectWorkPackage {
    pub id: u64,
    pub subject: String,
    #[serde(default)]
    pub lock_version: u64,
    #[serde(default)]
    pub description: Option<Formattable>,
    #[serde(rename = "_links", default)]
    pub links: WorkPackageLinks,
}

// =============================================================================
// Normalized entities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub id: u64,
    pub identifier: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectDetail {
    pub id: u64,
    pub identifier: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkPackageSummary {
    pub id: u64,
    pub subject: String,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
}

/// Work package with the fields needed to update it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkPackageDetail {
    pub id: u64,
    pub subject: String,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub lock_version: u64,
}

impl From<OpenProjectProject> for ProjectSummary {
    fn from(project: OpenProjectProject) -> Self {
        Self {
            id: project.id,
            identifier: project.identifier,
            name: project.name,
        }
    }
}

impl From<OpenProjectProject> for ProjectDetail {
    fn from(project: OpenProjectProject) -> Self {
        Self {
            id: project.id,
            identifier: project.identifier,
            name: project.name,
            description: project.description.and_then(|d| d.raw),
        }
    }
}

impl From<OpenProjectWorkPackage> for WorkPackageSummary {
    fn from(wp: OpenProjectWorkPackage) -> Self {
        Self {
            id: wp.id,
            subject: wp.subject,
            status: wp.links.status.title,
            kind: wp.links.type_link.title,
            url: wp.links.self_link.href,
        }
    }
}

impl From<OpenProjectWorkPackage> for WorkPackageDetail {
    fn from(wp: OpenProjectWorkPackage) -> Self {
        Self {
            id: wp.id,
            subject: wp.subject,
            status: wp.links.status.title,
            kind: wp.links.type_link.title,
            url: wp.links.self_link.href,
            description: wp.description.and_then(|d| d.raw),
            lock_version: wp.lock_version,
        }
    }
}

// =============================================================================
// Request types
// =============================================================================

/// `{ "href": "/api/v3/..." }` reference used in request `_links`.
#[derive(Debug, Clone, Serialize)]
pub struct LinkRef {
    pub href: String,
}

impl LinkRef {
    pub fn status(id: u64) -> Self {
        Self {
            href: format!("/api/v3/statuses/{}", id),
        }
    }

    pub fn work_package_type(id: u64) -> Self {
        Self {
            href: format!("/api/v3/types/{}", id),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkPackageLinksRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LinkRef>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_link: Option<LinkRef>,
}

impl WorkPackageLinksRequest {
    fn is_empty(&self) -> bool {
        self.status.is_none() && self.type_link.is_none()
    }
}

/// Request body for creating a work package.
#[derive(Debug, Clone, Serialize)]
pub struct CreateWorkPackageRequest {
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Formattable>,
    #[serde(rename = "_links", skip_serializing_if = "WorkPackageLinksRequest::is_empty")]
    pub links: WorkPackageLinksRequest,
}

/// Request body for updating a work package. `lockVersion` is mandatory
/// and must match the server's current value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkPackageRequest {
    pub lock_version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Formattable>,
    #[serde(rename = "_links", skip_serializing_if = "WorkPackageLinksRequest::is_empty")]
    pub links: WorkPackageLinksRequest,
}
