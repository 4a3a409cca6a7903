//! AppFlowy tool table.

use dsw_core::args::{self, page_or_default, path_segment};
use dsw_core::tool::{from_upstream, narrow, narrow_list};
use dsw_core::{Adapter, AdapterKind, Error, Result, ToolSpec, UpstreamRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::{
    AppFlowyDocument, AppFlowyResponse, AppFlowyWorkspace, CreateDocumentRequest,
    DocumentDetail, DocumentRef, DocumentSummary, UpdateDocumentRequest, WorkspaceSummary,
};

const DEFAULT_PAGE_SIZE: u32 = 20;

pub fn adapter() -> Adapter {
    Adapter::new(
        AdapterKind::AppFlowy,
        vec![
            ToolSpec::new(
                "appflowy_list_workspaces",
                "List the workspaces the token's user belongs to",
                json!({
                    "type": "object",
                    "properties": {}
                }),
                "workspaces",
                list_workspaces,
                data_list::<AppFlowyWorkspace, WorkspaceSummary>,
            ),
            ToolSpec::new(
                "appflowy_create_document",
                "Create a document in a workspace",
                json!({
                    "type": "object",
                    "properties": {
                        "workspace_id": { "type": "string", "minLength": 1 },
                        "name": { "type": "string", "minLength": 1 },
                        "parent_view_id": { "type": "string", "description": "Parent page; defaults to the workspace root" },
                        "content": { "type": "string", "description": "Initial document text" }
                    },
                    "required": ["workspace_id", "name"]
                }),
                "document",
                create_document,
                data::<AppFlowyDocument, DocumentSummary>,
            ),
            ToolSpec::new(
                "appflowy_get_document",
                "Get a document with its content",
                json!({
                    "type": "object",
                    "properties": {
                        "workspace_id": { "type": "string", "minLength": 1 },
                        "document_id": { "type": "string", "minLength": 1 }
                    },
                    "required": ["workspace_id", "document_id"]
                }),
                "document",
                get_document,
                data::<AppFlowyDocument, DocumentDetail>,
            ),
            ToolSpec::new(
                "appflowy_update_document",
                "Rename a document or replace its content",
                json!({
                    "type": "object",
                    "properties": {
                        "workspace_id": { "type": "string", "minLength": 1 },
                        "document_id": { "type": "string", "minLength": 1 },
                        "name": { "type": "string", "minLength": 1 },
                        "content": { "type": "string" }
                    },
                    "required": ["workspace_id", "document_id"]
                }),
                "document",
                update_document,
                data::<AppFlowyDocument, DocumentSummary>,
            ),
            ToolSpec::new(
                "appflowy_list_documents",
                "List documents in a workspace",
                json!({
                    "type": "object",
                    "properties": {
                        "workspace_id": { "type": "string", "minLength": 1 },
                        "page": { "type": "integer", "minimum": 1 },
                        "page_size": { "type": "integer", "minimum": 1, "maximum": 100 }
                    },
                    "required": ["workspace_id"]
                }),
                "documents",
                list_documents,
                data_list::<AppFlowyDocument, DocumentRef>,
            ),
            ToolSpec::new(
                "appflowy_search",
                "Full-text search across a workspace",
                json!({
                    "type": "object",
                    "properties": {
                        "workspace_id": { "type": "string", "minLength": 1 },
                        "query": { "type": "string", "minLength": 1 },
                        "limit": { "type": "integer", "minimum": 1, "maximum": 100 }
                    },
                    "required": ["workspace_id", "query"]
                }),
                "results",
                search,
                data_list::<AppFlowyDocument, DocumentRef>,
            ),
        ],
    )
}

// =============================================================================
// Envelope handling
// =============================================================================

/// Unwrap `{code, data, message}`; a non-zero code is an upstream error.
fn unwrap_envelope(body: Value) -> Result<Value> {
    let envelope: AppFlowyResponse = from_upstream(body)?;
    if envelope.code != 0 {
        // Envelope errors arrive with HTTP 200
        return Err(Error::Api {
            status: 200,
            message: envelope
                .message
                .unwrap_or_else(|| format!("AppFlowy error code {}", envelope.code)),
        });
    }
    Ok(envelope.data.unwrap_or(Value::Null))
}

fn data<T, U>(body: Value) -> Result<Value>
where
    T: DeserializeOwned,
    U: From<T> + Serialize,
{
    narrow::<T, U>(unwrap_envelope(body)?)
}

fn data_list<T, U>(body: Value) -> Result<Value>
where
    T: DeserializeOwned,
    U: From<T> + Serialize,
{
    narrow_list::<T, U>(unwrap_envelope(body)?)
}

fn documents_path(workspace_id: &str) -> String {
    format!("/api/workspace/{}/documents", path_segment(workspace_id))
}

fn document_path(workspace_id: &str, document_id: &str) -> String {
    format!(
        "{}/{}",
        documents_path(workspace_id),
        path_segment(document_id)
    )
}

// =============================================================================
// Parameters
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateDocumentParams {
    workspace_id: String,
    name: String,
    parent_view_id: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentParams {
    workspace_id: String,
    document_id: String,
}

#[derive(Debug, Deserialize)]
struct UpdateDocumentParams {
    workspace_id: String,
    document_id: String,
    name: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListDocumentsParams {
    workspace_id: String,
    page: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    workspace_id: String,
    query: String,
    limit: Option<u32>,
}

// =============================================================================
// Request mappers
// =============================================================================

fn list_workspaces(_arguments: &Value) -> Result<UpstreamRequest> {
    Ok(UpstreamRequest::get("/api/workspace"))
}

fn create_document(arguments: &Value) -> Result<UpstreamRequest> {
    let params: CreateDocumentParams = args::parse(arguments)?;
    let body = CreateDocumentRequest {
        name: params.name,
        parent_view_id: params.parent_view_id,
        content: params.content,
    };
    Ok(UpstreamRequest::post(documents_path(&params.workspace_id))
        .json(serde_json::to_value(body)?))
}

fn get_document(arguments: &Value) -> Result<UpstreamRequest> {
    let params: DocumentParams = args::parse(arguments)?;
    Ok(UpstreamRequest::get(document_path(
        &params.workspace_id,
        &params.document_id,
    )))
}

fn update_document(arguments: &Value) -> Result<UpstreamRequest> {
    let params: UpdateDocumentParams = args::parse(arguments)?;
    let body = UpdateDocumentRequest {
        name: params.name,
        content: params.content,
    };
    Ok(UpstreamRequest::patch(document_path(
        &params.workspace_id,
        &params.document_id,
    ))
    .json(serde_json::to_value(body)?))
}

fn list_documents(arguments: &Value) -> Result<UpstreamRequest> {
    let params: ListDocumentsParams = args::parse(arguments)?;
    Ok(UpstreamRequest::get(documents_path(&params.workspace_id))
        .query("page", page_or_default(params.page))
        .query("page_size", params.page_size.unwrap_or(DEFAULT_PAGE_SIZE)))
}

fn search(arguments: &Value) -> Result<UpstreamRequest> {
    let params: SearchParams = args::parse(arguments)?;
    Ok(UpstreamRequest::get(format!(
        "/api/search/{}",
        path_segment(&params.workspace_id)
    ))
    .query("query", params.query)
    .query("limit", params.limit.unwrap_or(DEFAULT_PAGE_SIZE)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(name: &str) -> ToolSpec {
        adapter()
            .find(name)
            .cloned()
            .unwrap_or_else(|| panic!("tool {} not registered", name))
    }

    #[test]
    fn test_create_document_request() {
        let req = tool("appflowy_create_document")
            .build_request(&json!({"workspace_id": "ws-1", "name": "Notes"}))
            .unwrap();

        assert_eq!(req.method.as_str(), "POST");
        assert_eq!(req.path, "/api/workspace/ws-1/documents");
        assert_eq!(req.body, Some(json!({"name": "Notes"})));
    }

    #[test]
    fn test_list_documents_defaults() {
        let req = tool("appflowy_list_documents")
            .build_request(&json!({"workspace_id": "ws-1"}))
            .unwrap();
        assert_eq!(
            req.query,
            vec![
                ("page".to_string(), "1".to_string()),
                ("page_size".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_request() {
        let req = tool("appflowy_search")
            .build_request(&json!({"workspace_id": "ws-1", "query": "road map"}))
            .unwrap();
        assert_eq!(req.path, "/api/search/ws-1");
        assert_eq!(req.query[0], ("query".to_string(), "road map".to_string()));
    }

    #[test]
    fn test_envelope_unwrapped() {
        let result = tool("appflowy_list_workspaces")
            .normalize(json!({
                "code": 0,
                "message": "success",
                "data": [{
                    "workspace_id": "ws-1",
                    "workspace_name": "Team",
                    "owner_uid": 12,
                    "icon": ""
                }]
            }))
            .unwrap();

        assert_eq!(
            result,
            json!({"success": true, "workspaces": [{"id": "ws-1", "name": "Team"}]})
        );
    }

    #[test]
    fn test_envelope_error_code() {
        let err = tool("appflowy_get_document")
            .normalize(json!({"code": 1012, "message": "Record not found", "data": null}))
            .unwrap_err();
        assert_eq!(err.upstream_message(), "Record not found");
    }

    #[test]
    fn test_document_detail_accepts_view_id() {
        let result = tool("appflowy_get_document")
            .normalize(json!({
                "code": 0,
                "data": {
                    "view_id": "doc-9",
                    "name": "Plan",
                    "workspace_id": "ws-1",
                    "content": "# Plan",
                    "created_by": 4
                }
            }))
            .unwrap();
        assert_eq!(
            result["document"],
            json!({"id": "doc-9", "name": "Plan", "workspace_id": "ws-1", "content": "# Plan"})
        );
    }

    // =========================================================================
    // Integration tests with httpmock
    // =========================================================================

    mod integration {
        use super::*;
        use dsw_core::{AdapterConfig, Config, Upstream};
        use httpmock::prelude::*;

        #[tokio::test]
        async fn test_search_round_trip() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(GET)
                    .path("/api/search/ws-1")
                    .query_param("query", "roadmap")
                    .query_param("limit", "20")
                    .header("Authorization", "Bearer af-token");
                then.status(200).json_body(json!({
                    "code": 0,
                    "message": "success",
                    "data": [
                        {"object_id": "doc-1", "title": "Roadmap", "score": 0.9, "preview": "Q1"},
                        {"object_id": "doc-2", "title": "Roadmap v2", "score": 0.7}
                    ]
                }));
            });

            let base_url = server.base_url();
            let config = AdapterConfig::resolve(
                AdapterKind::AppFlowy,
                &Config::default(),
                move |name| match name {
                    "APPFLOWY_API_URL" => Some(base_url.clone()),
                    "APPFLOWY_TOKEN" => Some("af-token".to_string()),
                    _ => None,
                },
            )
            .unwrap();

            let client = crate::client(&config).unwrap();
            let spec = tool("appflowy_search");
            let req = spec
                .build_request(&json!({"workspace_id": "ws-1", "query": "roadmap"}))
                .unwrap();
            let result = spec.normalize(client.send(req).await.unwrap()).unwrap();

            mock.assert();
            assert_eq!(
                result["results"],
                json!([
                    {"id": "doc-1", "name": "Roadmap"},
                    {"id": "doc-2", "name": "Roadmap v2"}
                ])
            );
        }
    }
}
