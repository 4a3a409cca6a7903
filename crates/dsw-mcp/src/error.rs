//! Protocol-level failures and their JSON-RPC / HTTP mapping.

use axum::http::StatusCode;
use thiserror::Error;

use crate::protocol::JsonRpcError;

/// A request the gateway refuses to answer with a `result`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Body is not JSON
    #[error("Parse error")]
    Parse,

    /// Envelope is not a valid JSON-RPC 2.0 request
    #[error("Invalid Request")]
    InvalidRequest,

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Tool arguments violate the tool's parameter schema
    #[error("Invalid params: {}", .0.join("; "))]
    InvalidParams(Vec<String>),

    /// Handler fault (missing or unknown tool name, ...)
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn to_rpc_error(&self) -> JsonRpcError {
        match self {
            GatewayError::Parse => JsonRpcError::parse_error(),
            GatewayError::InvalidRequest => JsonRpcError::invalid_request(),
            GatewayError::MethodNotFound(method) => JsonRpcError::method_not_found(method),
            GatewayError::InvalidParams(violations) => JsonRpcError::invalid_params(violations),
            GatewayError::Internal(message) => JsonRpcError::internal_error(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(GatewayError::Parse.status(), StatusCode::BAD_REQUEST);
        assert_eq!(GatewayError::InvalidRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::MethodNotFound("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::InvalidParams(vec![]).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_rpc_codes() {
        assert_eq!(GatewayError::Parse.to_rpc_error().code, -32700);
        assert_eq!(GatewayError::InvalidRequest.to_rpc_error().code, -32600);
        assert_eq!(
            GatewayError::MethodNotFound("x".into()).to_rpc_error().code,
            -32601
        );
        assert_eq!(
            GatewayError::InvalidParams(vec!["bad".into()]).to_rpc_error().code,
            -32602
        );
        assert_eq!(
            GatewayError::Internal("boom".into()).to_rpc_error().code,
            -32603
        );
    }

    #[test]
    fn test_display() {
        let err = GatewayError::InvalidParams(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Invalid params: a; b");
    }
}
