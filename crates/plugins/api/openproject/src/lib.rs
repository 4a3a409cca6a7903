//! OpenProject adapter for the MCP gateway.
//!
//! Projects and work packages through the OpenProject API v3. Responses
//! are HAL documents; collections carry their items under
//! `_embedded.elements` and relations live in `_links`.

mod tools;
mod types;

pub use tools::adapter;
pub use types::*;

use dsw_core::{AdapterConfig, AuthScheme, RestClient, Result};

/// OpenProject API keys authenticate as basic auth with a fixed user name.
const API_KEY_USER: &str = "apikey";

/// Build the OpenProject client from resolved configuration.
pub fn client(config: &AdapterConfig) -> Result<RestClient> {
    tracing::debug!(base_url = %config.base_url, "Creating OpenProject client");
    RestClient::with_timeout(
        &config.base_url,
        AuthScheme::Basic {
            username: API_KEY_USER.to_string(),
            password: config.token.clone(),
        },
        config.timeout_ms,
    )
}
