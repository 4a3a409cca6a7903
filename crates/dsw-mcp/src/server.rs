//! HTTP surface and process lifecycle.
//!
//! Routes:
//! - `POST /mcp`: JSON-RPC gateway
//! - `GET /health`: liveness plus adapter name and tool count
//!
//! A panic inside a handler is answered with HTTP 500 and -32603.
//!
//! The server stops accepting connections on SIGINT/SIGTERM and returns
//! once in-flight requests have finished.

use std::any::Any;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::context::GatewayContext;
use crate::gateway;
use crate::protocol::{JsonRpcError, JsonRpcResponse, RequestId};

/// Build the axum router for one adapter process.
pub fn router(ctx: GatewayContext) -> Router {
    Router::new()
        .route("/mcp", post(mcp_handler))
        .route("/health", get(health_handler))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn mcp_handler(State(ctx): State<GatewayContext>, body: Bytes) -> Response {
    let (status, response) = gateway::handle(&ctx, &body).await;
    (status, Json(response)).into_response()
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Handler panicked".to_string()
    };
    tracing::error!(error = %message, "Handler panicked");

    let body = JsonRpcResponse::error(RequestId::Null, JsonRpcError::internal_error(&message));
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

async fn health_handler(State(ctx): State<GatewayContext>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "adapter": ctx.registry.kind().name(),
        "tools": ctx.registry.len(),
    }))
}

/// Bind `addr` and serve until a shutdown signal arrives.
pub async fn serve(ctx: GatewayContext, addr: &str) -> std::io::Result<()> {
    let adapter = ctx.registry.kind();
    let tools = ctx.registry.len();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        adapter = %adapter,
        addr = %listener.local_addr()?,
        tools,
        "MCP gateway listening"
    );

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(adapter = %adapter, "MCP gateway stopped");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(signal = "SIGINT", "Shutting down"),
        _ = terminate => info!(signal = "SIGTERM", "Shutting down"),
    }
}
