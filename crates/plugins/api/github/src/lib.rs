//! GitHub adapter for the MCP gateway.
//!
//! Exposes issue, pull request and repository tools backed by the
//! GitHub REST API v3.

mod tools;
mod types;

pub use tools::adapter;
pub use types::*;

use dsw_core::{AdapterConfig, AuthScheme, RestClient, Result};

/// GitHub REST API version pinned in every request.
const API_VERSION: &str = "2022-11-28";

/// Build the authenticated GitHub client from resolved configuration.
pub fn client(config: &AdapterConfig) -> Result<RestClient> {
    tracing::debug!(base_url = %config.base_url, "Creating GitHub client");
    Ok(RestClient::with_timeout(
        &config.base_url,
        AuthScheme::Bearer(config.token.clone()),
        config.timeout_ms,
    )?
    .with_header("Accept", "application/vnd.github+json")
    .with_header("X-GitHub-Api-Version", API_VERSION))
}
