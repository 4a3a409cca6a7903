//! Envelope validation and method dispatch.
//!
//! Turns a raw request body into an HTTP status plus JSON-RPC response.

use axum::http::StatusCode;
use serde_json::Value;
use tracing::{debug, error};

use crate::context::GatewayContext;
use crate::error::GatewayError;
use crate::protocol::{
    JsonRpcRequest, JsonRpcResponse, RequestId, JSONRPC_VERSION, METHOD_CALL_TOOL,
    METHOD_LIST_TOOLS,
};
use crate::router;

/// Validate the JSON-RPC 2.0 envelope.
///
/// On failure, the returned id is whatever the caller sent (or null) so the
/// error response can still be correlated.
pub fn parse_envelope(body: &[u8]) -> Result<JsonRpcRequest, (RequestId, GatewayError)> {
    let value: Value =
        serde_json::from_slice(body).map_err(|_| (RequestId::Null, GatewayError::Parse))?;

    let Value::Object(mut envelope) = value else {
        return Err((RequestId::Null, GatewayError::InvalidRequest));
    };

    let id = RequestId::from_value(envelope.get("id"));
    let version_ok = envelope.get("jsonrpc").and_then(Value::as_str) == Some(JSONRPC_VERSION);
    let method = envelope
        .get("method")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    match method {
        Some(method) if version_ok && id.is_valid() => Ok(JsonRpcRequest {
            id,
            method,
            params: envelope.remove("params"),
        }),
        _ => Err((id, GatewayError::InvalidRequest)),
    }
}

/// Handle one `POST /mcp` body.
pub async fn handle(ctx: &GatewayContext, body: &[u8]) -> (StatusCode, JsonRpcResponse) {
    let request = match parse_envelope(body) {
        Ok(request) => request,
        Err((id, err)) => {
            debug!(error = %err, "Rejected request envelope");
            return reply_error(id, err);
        }
    };

    debug!(method = %request.method, id = ?request.id, "Handling request");

    let outcome = match request.method.as_str() {
        METHOD_LIST_TOOLS => list_tools(ctx),
        METHOD_CALL_TOOL => router::call_tool(ctx, request.params).await,
        method => Err(GatewayError::MethodNotFound(method.to_string())),
    };

    match outcome {
        Ok(result) => (StatusCode::OK, JsonRpcResponse::success(request.id, result)),
        Err(err) => {
            if let GatewayError::Internal(message) = &err {
                error!(method = %request.method, error = %message, "Request failed");
            }
            reply_error(request.id, err)
        }
    }
}

fn list_tools(ctx: &GatewayContext) -> Result<Value, GatewayError> {
    serde_json::to_value(ctx.registry.descriptors())
        .map_err(|e| GatewayError::Internal(e.to_string()))
}

fn reply_error(id: RequestId, err: GatewayError) -> (StatusCode, JsonRpcResponse) {
    (err.status(), JsonRpcResponse::error(id, err.to_rpc_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<JsonRpcRequest, (RequestId, GatewayError)> {
        parse_envelope(value.to_string().as_bytes())
    }

    #[test]
    fn test_valid_envelope() {
        let request = parse(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "mcp.callTool",
            "params": {"name": "x"}
        }))
        .unwrap();

        assert_eq!(request.id, 1.into());
        assert_eq!(request.method, "mcp.callTool");
        assert_eq!(request.params, Some(json!({"name": "x"})));
    }

    #[test]
    fn test_zero_id_is_rejected_and_echoed() {
        let err = parse(json!({"jsonrpc": "2.0", "id": 0, "method": "mcp.listTools"}))
            .unwrap_err();
        assert_eq!(err, (0.into(), GatewayError::InvalidRequest));
    }

    #[test]
    fn test_not_json() {
        let err = parse_envelope(b"{not json").unwrap_err();
        assert_eq!(err, (RequestId::Null, GatewayError::Parse));
    }

    #[test]
    fn test_wrong_version_keeps_id() {
        let err = parse(json!({"jsonrpc": "1.0", "id": "req-1", "method": "mcp.listTools"}))
            .unwrap_err();
        assert_eq!(
            err,
            (RequestId::String("req-1".into()), GatewayError::InvalidRequest)
        );
    }

    #[test]
    fn test_invalid_envelopes() {
        for body in [
            json!({"id": 1, "method": "m"}),
            json!({"jsonrpc": "2.0", "method": "m"}),
            json!({"jsonrpc": "2.0", "id": "", "method": "m"}),
            json!({"jsonrpc": "2.0", "id": null, "method": "m"}),
            json!({"jsonrpc": "2.0", "id": 1}),
            json!({"jsonrpc": "2.0", "id": 1, "method": ""}),
            json!({"jsonrpc": "2.0", "id": 1, "method": 5}),
            json!([1, 2, 3]),
            json!("2.0"),
        ] {
            let (_, err) = parse(body.clone()).unwrap_err();
            assert_eq!(err, GatewayError::InvalidRequest, "body: {}", body);
        }
    }

    #[test]
    fn test_missing_id_is_null() {
        let (id, _) = parse(json!({"jsonrpc": "2.0", "method": "m"})).unwrap_err();
        assert_eq!(id, RequestId::Null);
    }
}
