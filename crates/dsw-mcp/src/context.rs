//! Per-process gateway state.

use std::sync::Arc;

use dsw_core::{AdapterConfig, Result, Upstream};

use crate::adapters;
use crate::registry::Registry;

/// Everything a request handler needs. Built once at startup and cloned
/// cheaply into each request.
#[derive(Clone)]
pub struct GatewayContext {
    pub registry: Arc<Registry>,
    pub upstream: Arc<dyn Upstream>,
}

impl GatewayContext {
    pub fn new(registry: Registry, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            registry: Arc::new(registry),
            upstream,
        }
    }

    /// Production context: the adapter's tool table and its authenticated
    /// REST client.
    pub fn from_config(config: &AdapterConfig) -> Result<Self> {
        let registry = Registry::new(adapters::adapter_for(config.kind))?;
        let upstream = adapters::client_for(config)?;
        Ok(Self::new(registry, upstream))
    }
}

impl std::fmt::Debug for GatewayContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayContext")
            .field("adapter", &self.registry.kind())
            .field("tools", &self.registry.len())
            .finish()
    }
}
