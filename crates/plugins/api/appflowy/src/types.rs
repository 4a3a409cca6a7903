//! AppFlowy Cloud API types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response envelope used by every AppFlowy Cloud endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AppFlowyResponse {
    pub code: i64,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Upstream responses
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AppFlowyWorkspace {
    pub workspace_id: String,
    pub workspace_name: String,
}

/// Document (a page view). Search hits and views name the id differently.
#[derive(Debug, Clone, Deserialize)]
pub struct AppFlowyDocument {
    #[serde(alias = "view_id", alias = "object_id")]
    pub id: String,
    #[serde(default, alias = "title")]
    pub name: String,
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

// =============================================================================
// Normalized entities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspaceSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub name: String,
    pub workspace_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentDetail {
    pub id: String,
    pub name: String,
    pub workspace_id: Option<String>,
    pub content: Option<String>,
}

/// Entry of a document listing or search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRef {
    pub id: String,
    pub name: String,
}

impl From<AppFlowyWorkspace> for WorkspaceSummary {
    fn from(workspace: AppFlowyWorkspace) -> Self {
        Self {
            id: workspace.workspace_id,
            name: workspace.workspace_name,
        }
    }
}

impl From<AppFlowyDocument> for DocumentSummary {
    fn from(doc: AppFlowyDocument) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            workspace_id: doc.workspace_id,
        }
    }
}

impl From<AppFlowyDocument> for DocumentDetail {
    fn from(doc: AppFlowyDocument) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            workspace_id: doc.workspace_id,
            content: doc.content,
        }
    }
}

impl From<AppFlowyDocument> for DocumentRef {
    fn from(doc: AppFlowyDocument) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
        }
    }
}

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CreateDocumentRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_view_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateDocumentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
