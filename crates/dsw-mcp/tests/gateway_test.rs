//! End-to-end tests of the HTTP gateway with the GitHub tool table.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use dsw_core::{AdapterConfig, AdapterKind, Config, Error, Result, Upstream, UpstreamRequest};
use dsw_mcp::adapters::adapter_for;
use dsw_mcp::{http_router, GatewayContext, Registry};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Canned upstream that records what it was asked to do.
struct StubUpstream {
    reply: Box<dyn Fn() -> Result<Value> + Send + Sync>,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl StubUpstream {
    fn replying(reply: impl Fn() -> Result<Value> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Upstream for StubUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request);
        (self.reply)()
    }
}

fn github_context(upstream: Arc<StubUpstream>) -> GatewayContext {
    let registry = Registry::new(adapter_for(AdapterKind::GitHub)).unwrap();
    GatewayContext::new(registry, upstream)
}

async fn post_raw(ctx: &GatewayContext, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = http_router(ctx.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(ctx: &GatewayContext, body: Value) -> (StatusCode, Value) {
    post_raw(ctx, body.to_string()).await
}

fn call(id: i64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "mcp.callTool",
        "params": {"name": name, "arguments": arguments}
    })
}

// =============================================================================
// Envelope
// =============================================================================

#[tokio::test]
async fn test_malformed_json_is_parse_error() {
    let ctx = github_context(StubUpstream::replying(|| Ok(json!({}))));
    let (status, body) = post_raw(&ctx, "{\"jsonrpc\":").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn test_wrong_version_is_invalid_request_for_any_method() {
    let ctx = github_context(StubUpstream::replying(|| Ok(json!({}))));

    for method in ["mcp.listTools", "mcp.callTool", "anything"] {
        let (status, body) = post(
            &ctx,
            json!({"jsonrpc": "1.0", "id": 7, "method": method}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], -32600);
        assert_eq!(body["error"]["message"], "Invalid Request");
        assert_eq!(body["id"], 7);
        assert!(body.get("result").is_none());
    }
}

#[tokio::test]
async fn test_missing_id_is_invalid_request() {
    let ctx = github_context(StubUpstream::replying(|| Ok(json!({}))));
    let (status, body) = post(&ctx, json!({"jsonrpc": "2.0", "method": "mcp.listTools"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], -32600);
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn test_zero_id_is_invalid_request() {
    let ctx = github_context(StubUpstream::replying(|| Ok(json!({}))));
    let (status, body) = post(
        &ctx,
        json!({"jsonrpc": "2.0", "id": 0, "method": "mcp.listTools"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], -32600);
    assert_eq!(body["id"], 0);
    assert!(body.get("result").is_none());
}

#[tokio::test]
async fn test_unknown_method() {
    let ctx = github_context(StubUpstream::replying(|| Ok(json!({}))));
    let (status, body) = post(
        &ctx,
        json!({"jsonrpc": "2.0", "id": "a", "method": "tools/list"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], -32601);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("tools/list"));
    assert_eq!(body["id"], "a");
}

// =============================================================================
// mcp.listTools
// =============================================================================

#[tokio::test]
async fn test_list_tools_is_idempotent() {
    let ctx = github_context(StubUpstream::replying(|| Ok(json!({}))));
    let request = json!({"jsonrpc": "2.0", "id": 1, "method": "mcp.listTools"});

    let (status, first) = post(&ctx, request.clone()).await;
    let (_, second) = post(&ctx, request.clone()).await;
    let (_, third) = post(&ctx, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(first["result"].is_array());
    assert_eq!(first["result"], second["result"]);
    assert_eq!(second["result"], third["result"]);
}

#[tokio::test]
async fn test_list_tools_github_create_issue_schema() {
    let ctx = github_context(StubUpstream::replying(|| Ok(json!({}))));
    let (status, body) = post(
        &ctx,
        json!({"jsonrpc": "2.0", "id": 1, "method": "mcp.listTools"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], 1);

    let tools = body["result"].as_array().unwrap();
    let create = tools
        .iter()
        .find(|t| t["name"] == "github_create_issue")
        .expect("github_create_issue listed");
    assert_eq!(
        create["parameter_schema"]["required"],
        json!(["repository", "title"])
    );
    assert!(create["description"].is_string());
}

// =============================================================================
// mcp.callTool
// =============================================================================

#[tokio::test]
async fn test_unknown_tool_is_internal_error() {
    let upstream = StubUpstream::replying(|| Ok(json!({})));
    let ctx = github_context(upstream.clone());
    let (status, body) = post(&ctx, call(3, "github_delete_everything", json!({}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], -32603);
    assert!(body["error"]["data"]
        .as_str()
        .unwrap()
        .contains("Unknown tool: github_delete_everything"));
    assert!(upstream.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_tool_name_is_internal_error() {
    let ctx = github_context(StubUpstream::replying(|| Ok(json!({}))));
    let (status, body) = post(
        &ctx,
        json!({"jsonrpc": "2.0", "id": 4, "method": "mcp.callTool", "params": {}}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["data"], "Tool name is required");
}

#[tokio::test]
async fn test_create_issue_result_is_whitelisted() {
    let upstream = StubUpstream::replying(|| {
        Ok(json!({
            "number": 5,
            "html_url": "u",
            "title": "t",
            "state": "open",
            "id": 1,
            "node_id": "I_1",
            "user": {"login": "octocat"},
            "labels": []
        }))
    });
    let ctx = github_context(upstream.clone());
    let (status, body) = post(
        &ctx,
        call(5, "github_create_issue", json!({"repository": "o/r", "title": "t"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["result"],
        json!({
            "success": true,
            "issue": {"number": 5, "url": "u", "title": "t", "state": "open"}
        })
    );

    let requests = upstream.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/repos/o/r/issues");
    assert_eq!(requests[0].body, Some(json!({"title": "t"})));
}

#[tokio::test]
async fn test_upstream_rejection_is_unsuccessful_result() {
    let ctx = github_context(StubUpstream::replying(|| {
        Err(Error::from_status(401, "Bad credentials".to_string()))
    }));
    let (status, body) = post(
        &ctx,
        call(6, "github_create_issue", json!({"repository": "o/r", "title": "t"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_none());
    assert_eq!(
        body["result"],
        json!({"success": false, "error": "Bad credentials"})
    );
}

#[tokio::test]
async fn test_upstream_timeout_is_unsuccessful_result() {
    let ctx = github_context(StubUpstream::replying(|| Err(Error::Timeout(10_000))));
    let (status, body) = post(
        &ctx,
        call(8, "github_get_repository", json!({"repository": "o/r"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["success"], false);
    assert_eq!(
        body["result"]["error"],
        "Request timed out after 10000 ms"
    );
}

#[tokio::test]
async fn test_handler_panic_is_internal_error() {
    let ctx = github_context(StubUpstream::replying(|| -> Result<Value> {
        panic!("mapper exploded")
    }));
    let (status, body) = post(
        &ctx,
        call(12, "github_get_repository", json!({"repository": "o/r"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], -32603);
    assert_eq!(body["error"]["data"], "mapper exploded");
}

#[tokio::test]
async fn test_schema_violation_is_invalid_params() {
    let upstream = StubUpstream::replying(|| Ok(json!({})));
    let ctx = github_context(upstream.clone());
    let (status, body) = post(
        &ctx,
        call(9, "github_create_issue", json!({"repository": "o/r"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], -32602);
    let violations = body["error"]["data"].as_array().unwrap();
    assert!(violations
        .iter()
        .any(|v| v.as_str().unwrap().contains("title")));
    assert!(upstream.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_repository_outside_owner_repo_is_invalid_params() {
    let upstream = StubUpstream::replying(|| Ok(json!({})));
    let ctx = github_context(upstream.clone());

    for repository in ["o/r#", "o/r?x=1", "../user", "o/.."] {
        let (status, body) = post(
            &ctx,
            call(
                11,
                "github_update_issue",
                json!({"repository": repository, "issue_number": 9, "title": "x"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "repository: {}", repository);
        assert_eq!(body["error"]["code"], -32602, "repository: {}", repository);
    }
    assert!(upstream.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_argument_type_is_invalid_params() {
    let ctx = github_context(StubUpstream::replying(|| Ok(json!({}))));
    let (status, body) = post(
        &ctx,
        call(
            10,
            "github_get_issue",
            json!({"repository": "o/r", "issue_number": "seven"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], -32602);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let ctx = github_context(StubUpstream::replying(|| Ok(json!({}))));
    let response = http_router(ctx)
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"status": "ok", "adapter": "github", "tools": 8}));
}

// =============================================================================
// Real client against a mocked upstream
// =============================================================================

#[tokio::test]
async fn test_gitlab_end_to_end_with_mock_upstream() {
    use httpmock::prelude::*;

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v4/projects")
                .query_param("membership", "true")
                .header("PRIVATE-TOKEN", "glpat-e2e");
            then.status(200).json_body(json!([{
                "id": 3,
                "name": "Gateway",
                "path": "gateway",
                "path_with_namespace": "dev/gateway",
                "web_url": "https://gitlab.example.com/dev/gateway",
                "runners_token": "should-not-leak"
            }]));
        })
        .await;

    let base_url = server.base_url();
    let config = AdapterConfig::resolve(AdapterKind::GitLab, &Config::default(), move |name| {
        match name {
            "GITLAB_API_URL" => Some(base_url.clone()),
            "GITLAB_TOKEN" => Some("glpat-e2e".to_string()),
            _ => None,
        }
    })
    .unwrap();
    let ctx = GatewayContext::from_config(&config).unwrap();

    let (status, body) = post(&ctx, call(11, "gitlab_list_projects", json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["result"],
        json!({
            "success": true,
            "projects": [{
                "id": 3,
                "name": "Gateway",
                "path": "dev/gateway",
                "url": "https://gitlab.example.com/dev/gateway"
            }]
        })
    );
}
