//! AppFlowy adapter for the MCP gateway.
//!
//! Workspaces, documents and search through the AppFlowy Cloud REST API.
//! Every response is wrapped in a `{code, data, message}` envelope; a
//! non-zero `code` is an error even when the HTTP status is 200.

mod tools;
mod types;

pub use tools::adapter;
pub use types::*;

use dsw_core::{AdapterConfig, AuthScheme, RestClient, Result};

/// Build the AppFlowy client, authenticated with a bearer token.
pub fn client(config: &AdapterConfig) -> Result<RestClient> {
    tracing::debug!(base_url = %config.base_url, "Creating AppFlowy client");
    RestClient::with_timeout(
        &config.base_url,
        AuthScheme::Bearer(config.token.clone()),
        config.timeout_ms,
    )
}
