//! Tool router: `mcp.callTool` → one upstream call → normalized result.

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::context::GatewayContext;
use crate::error::GatewayError;
use crate::protocol::ToolCallParams;

/// Execute a tool call.
///
/// Protocol problems (missing/unknown tool, bad arguments) are errors.
/// Upstream failures are not: they come back as `{success: false, error}`.
pub async fn call_tool(
    ctx: &GatewayContext,
    params: Option<Value>,
) -> Result<Value, GatewayError> {
    let params: ToolCallParams = params
        .and_then(|p| serde_json::from_value(p).ok())
        .unwrap_or_default();

    let name = match params.name {
        Some(name) if !name.is_empty() => name,
        _ => return Err(GatewayError::Internal("Tool name is required".to_string())),
    };

    let tool = ctx
        .registry
        .get(&name)
        .ok_or_else(|| GatewayError::Internal(format!("Unknown tool: {}", name)))?;

    let arguments = match params.arguments {
        None | Some(Value::Null) => json!({}),
        Some(arguments) => arguments,
    };

    let violations = tool.violations(&arguments);
    if !violations.is_empty() {
        debug!(tool = %name, ?violations, "Tool arguments rejected");
        return Err(GatewayError::InvalidParams(violations));
    }

    let request = tool
        .spec
        .build_request(&arguments)
        .map_err(|e| GatewayError::InvalidParams(vec![e.to_string()]))?;

    debug!(tool = %name, method = %request.method, path = %request.path, "Calling upstream");

    let outcome = match ctx.upstream.send(request).await {
        Ok(body) => tool.spec.normalize(body),
        Err(e) => Err(e),
    };

    Ok(match outcome {
        Ok(result) => result,
        Err(e) => {
            warn!(tool = %name, error = %e, "Tool call failed");
            json!({ "success": false, "error": e.upstream_message() })
        }
    })
}
