//! Adapter lookup by kind.

use std::sync::Arc;

use dsw_core::{Adapter, AdapterConfig, AdapterKind, Result, Upstream};

/// Tool table for an adapter.
pub fn adapter_for(kind: AdapterKind) -> Adapter {
    match kind {
        AdapterKind::GitHub => dsw_github::adapter(),
        AdapterKind::GitLab => dsw_gitlab::adapter(),
        AdapterKind::OpenProject => dsw_openproject::adapter(),
        AdapterKind::AppFlowy => dsw_appflowy::adapter(),
    }
}

/// Authenticated upstream client for an adapter.
pub fn client_for(config: &AdapterConfig) -> Result<Arc<dyn Upstream>> {
    let client = match config.kind {
        AdapterKind::GitHub => dsw_github::client(config)?,
        AdapterKind::GitLab => dsw_gitlab::client(config)?,
        AdapterKind::OpenProject => dsw_openproject::client(config)?,
        AdapterKind::AppFlowy => dsw_appflowy::client(config)?,
    };
    Ok(Arc::new(client))
}
