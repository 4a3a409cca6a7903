//! Upstream REST client.
//!
//! Every tool invocation becomes exactly one [`UpstreamRequest`], sent through
//! an [`Upstream`] implementation. [`RestClient`] is the production one; tests
//! substitute fakes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::DEFAULT_TIMEOUT_MS;
use crate::{Error, Result};

const USER_AGENT: &str = "dev-server-workflow";

// =============================================================================
// Request description
// =============================================================================

/// One upstream call, relative to the adapter's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl UpstreamRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a query parameter only when a value is present.
    pub fn query_opt<T: ToString>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

// =============================================================================
// Upstream abstraction
// =============================================================================

/// Something that can execute upstream requests and return the JSON body.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Execute a request. Non-2xx responses and transport failures are errors.
    async fn send(&self, request: UpstreamRequest) -> Result<Value>;
}

/// How the adapter authenticates against its upstream.
#[derive(Clone)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// `PRIVATE-TOKEN: <token>`
    PrivateToken(String),
    /// HTTP basic auth
    Basic { username: String, password: String },
}

impl AuthScheme {
    fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            AuthScheme::Bearer(token) => builder.bearer_auth(token),
            AuthScheme::PrivateToken(token) => builder.header("PRIVATE-TOKEN", token),
            AuthScheme::Basic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
        }
    }
}

// Credentials stay out of debug output.
impl std::fmt::Debug for AuthScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scheme = match self {
            AuthScheme::Bearer(_) => "Bearer",
            AuthScheme::PrivateToken(_) => "PrivateToken",
            AuthScheme::Basic { .. } => "Basic",
        };
        f.debug_tuple("AuthScheme").field(&scheme).finish()
    }
}

// =============================================================================
// reqwest implementation
// =============================================================================

/// Authenticated JSON client for one upstream API.
#[derive(Debug)]
pub struct RestClient {
    base_url: String,
    auth: AuthScheme,
    headers: Vec<(&'static str, String)>,
    timeout_ms: u64,
    client: reqwest::Client,
}

impl RestClient {
    /// Create a client with the default 10 second timeout.
    pub fn new(base_url: impl Into<String>, auth: AuthScheme) -> Result<Self> {
        Self::with_timeout(base_url, auth, DEFAULT_TIMEOUT_MS)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        auth: AuthScheme,
        timeout_ms: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
            headers: Vec::new(),
            timeout_ms,
            client,
        })
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Map a reqwest transport failure.
    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout(self.timeout_ms)
        } else {
            Error::Http(err.to_string())
        }
    }

    /// Handle response and map errors.
    async fn handle_response(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
            warn!(
                status = status_code,
                message = message.as_str(),
                "Upstream API error response"
            );
            return Err(Error::from_status(status_code, message));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        if bytes.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| Error::InvalidData(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl Upstream for RestClient {
    async fn send(&self, request: UpstreamRequest) -> Result<Value> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(method = %request.method, url = %url, "Upstream request");

        let mut builder = self.auth.apply(self.client.request(request.method, &url));
        for (name, value) in &self.headers {
            builder = builder.header(*name, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        self.handle_response(response).await
    }
}

/// Pull a human-readable message out of an upstream error body.
///
/// All four upstreams put it under `message`; GitLab sometimes uses `error`
/// or a structured `message` object instead.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(json) = serde_json::from_str::<Value>(trimmed) else {
        return Some(trimmed.to_string());
    };

    ["message", "error", "error_description"]
        .iter()
        .find_map(|key| json.get(*key))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .or_else(|| Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = UpstreamRequest::get("/repos/o/r/issues")
            .query("state", "open")
            .query("page", 1)
            .query_opt::<u32>("per_page", None);

        assert_eq!(req.method, Method::GET);
        assert_eq!(
            req.query,
            vec![
                ("state".to_string(), "open".to_string()),
                ("page".to_string(), "1".to_string())
            ]
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"message":"Bad credentials"}"#),
            Some("Bad credentials".to_string())
        );
        assert_eq!(
            error_message(r#"{"error":"invalid_token"}"#),
            Some("invalid_token".to_string())
        );
        assert_eq!(
            error_message(r#"{"message":{"title":["can't be blank"]}}"#),
            Some(r#"{"title":["can't be blank"]}"#.to_string())
        );
        assert_eq!(error_message("Bad Gateway"), Some("Bad Gateway".to_string()));
        assert_eq!(error_message("   "), None);
    }

    #[test]
    fn test_auth_debug_hides_secret() {
        let debug = format!("{:?}", AuthScheme::Bearer("ghp_secret".into()));
        assert!(!debug.contains("ghp_secret"));
    }

    // =========================================================================
    // Integration tests with httpmock
    // =========================================================================

    mod integration {
        use super::*;
        use httpmock::prelude::*;
        use serde_json::json;

        #[tokio::test]
        async fn test_bearer_get_with_query() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(GET)
                    .path("/repos/o/r/issues")
                    .query_param("state", "open")
                    .header("Authorization", "Bearer ghp_test")
                    .header("Accept", "application/vnd.github+json");
                then.status(200).json_body(json!([{"number": 1}]));
            });

            let client = RestClient::new(server.base_url(), AuthScheme::Bearer("ghp_test".into()))
                .unwrap()
                .with_header("Accept", "application/vnd.github+json");

            let body = client
                .send(UpstreamRequest::get("/repos/o/r/issues").query("state", "open"))
                .await
                .unwrap();

            mock.assert();
            assert_eq!(body, json!([{"number": 1}]));
        }

        #[tokio::test]
        async fn test_private_token_post_json() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(POST)
                    .path("/api/v4/projects/1/issues")
                    .header("PRIVATE-TOKEN", "glpat")
                    .body_includes("\"title\":\"Hello\"");
                then.status(201).json_body(json!({"iid": 3}));
            });

            let client =
                RestClient::new(server.base_url(), AuthScheme::PrivateToken("glpat".into())).unwrap();
            let body = client
                .send(UpstreamRequest::post("/api/v4/projects/1/issues").json(json!({"title": "Hello"})))
                .await
                .unwrap();

            assert_eq!(body["iid"], 3);
        }

        #[tokio::test]
        async fn test_basic_auth() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET)
                    .path("/api/v3/projects")
                    .header("Authorization", "Basic YXBpa2V5OnRvaw==");
                then.status(200).json_body(json!({"total": 0}));
            });

            let client = RestClient::new(
                server.base_url(),
                AuthScheme::Basic {
                    username: "apikey".into(),
                    password: "tok".into(),
                },
            )
            .unwrap();
            let body = client.send(UpstreamRequest::get("/api/v3/projects")).await.unwrap();

            assert_eq!(body["total"], 0);
        }

        #[tokio::test]
        async fn test_error_status_mapping() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/user");
                then.status(401).json_body(json!({"message": "Bad credentials"}));
            });

            let client = RestClient::new(server.base_url(), AuthScheme::Bearer("bad".into())).unwrap();
            let err = client.send(UpstreamRequest::get("/user")).await.unwrap_err();

            match err {
                Error::Auth(message) => assert_eq!(message, "Bad credentials"),
                other => panic!("expected auth error, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_empty_body_is_null() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(PATCH).path("/thing");
                then.status(204);
            });

            let client = RestClient::new(server.base_url(), AuthScheme::Bearer("t".into())).unwrap();
            let body = client
                .send(UpstreamRequest::patch("/thing").json(json!({})))
                .await
                .unwrap();

            assert_eq!(body, Value::Null);
        }

        #[tokio::test]
        async fn test_timeout() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/slow");
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .json_body(json!({}));
            });

            let client =
                RestClient::with_timeout(server.base_url(), AuthScheme::Bearer("t".into()), 50)
                    .unwrap();
            let err = client.send(UpstreamRequest::get("/slow")).await.unwrap_err();

            assert!(matches!(err, Error::Timeout(50)));
        }

        #[tokio::test]
        async fn test_invalid_json_body() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/html");
                then.status(200).body("<html></html>");
            });

            let client = RestClient::new(server.base_url(), AuthScheme::Bearer("t".into())).unwrap();
            let err = client.send(UpstreamRequest::get("/html")).await.unwrap_err();

            assert!(matches!(err, Error::InvalidData(_)));
        }
    }
}
