//! GitLab adapter for the MCP gateway.
//!
//! Issues, notes, merge requests and projects through the GitLab REST
//! API v4. Projects are addressed by numeric id or by their full path,
//! which is URL-encoded into a single path segment.

mod tools;
mod types;

pub use tools::adapter;
pub use types::*;

use dsw_core::{AdapterConfig, AuthScheme, RestClient, Result};

/// Build the GitLab client, authenticated with a `PRIVATE-TOKEN` header.
pub fn client(config: &AdapterConfig) -> Result<RestClient> {
    tracing::debug!(base_url = %config.base_url, "Creating GitLab client");
    RestClient::with_timeout(
        &config.base_url,
        AuthScheme::PrivateToken(config.token.clone()),
        config.timeout_ms,
    )
}
