//! Declarative tool tables.
//!
//! An adapter is data: a list of [`ToolSpec`]s, each pairing a static
//! [`ToolDescriptor`] with a request mapper (arguments → one upstream call)
//! and a response mapper (upstream JSON → whitelisted entity).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AdapterKind;
use crate::http::UpstreamRequest;
use crate::{Error, Result};

/// Tool definition returned by `mcp.listTools`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameter_schema: Value,
}

/// Builds the upstream request from already schema-validated arguments.
pub type RequestMapper = fn(&Value) -> Result<UpstreamRequest>;

/// Narrows the upstream response body to the fields the tool exposes.
pub type ResponseMapper = fn(Value) -> Result<Value>;

/// One registered tool.
#[derive(Clone)]
pub struct ToolSpec {
    pub descriptor: ToolDescriptor,
    /// Key under which the mapped entity appears in the normalized result
    pub entity: &'static str,
    pub request: RequestMapper,
    pub response: ResponseMapper,
}

impl ToolSpec {
    pub fn new(
        name: &str,
        description: &str,
        parameter_schema: Value,
        entity: &'static str,
        request: RequestMapper,
        response: ResponseMapper,
    ) -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: name.to_string(),
                description: description.to_string(),
                parameter_schema,
            },
            entity,
            request,
            response,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Map arguments onto the upstream call.
    pub fn build_request(&self, arguments: &Value) -> Result<UpstreamRequest> {
        (self.request)(arguments)
    }

    /// Map an upstream body to `{success: true, <entity>: ...}`.
    pub fn normalize(&self, body: Value) -> Result<Value> {
        let entity = (self.response)(body)?;
        let mut result = serde_json::Map::new();
        result.insert("success".to_string(), Value::Bool(true));
        result.insert(self.entity.to_string(), entity);
        Ok(Value::Object(result))
    }
}

impl std::fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSpec")
            .field("name", &self.descriptor.name)
            .field("entity", &self.entity)
            .finish()
    }
}

/// Tool table for one upstream system.
#[derive(Debug, Clone)]
pub struct Adapter {
    pub kind: AdapterKind,
    tools: Vec<ToolSpec>,
}

impl Adapter {
    pub fn new(kind: AdapterKind, tools: Vec<ToolSpec>) -> Self {
        Self { kind, tools }
    }

    /// Tools in registration order.
    pub fn tools(&self) -> &[ToolSpec] {
        &self.tools
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor.clone()).collect()
    }

    pub fn find(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.name() == name)
    }
}

// =============================================================================
// Response narrowing
// =============================================================================

/// Deserialize an upstream body as `T` and re-serialize it as the
/// whitelisted `U`. Fields not carried by `U` are dropped.
pub fn narrow<T, U>(body: Value) -> Result<Value>
where
    T: DeserializeOwned,
    U: From<T> + Serialize,
{
    let raw: T = from_upstream(body)?;
    Ok(serde_json::to_value(U::from(raw))?)
}

/// [`narrow`] applied to every element of an upstream JSON array.
pub fn narrow_list<T, U>(body: Value) -> Result<Value>
where
    T: DeserializeOwned,
    U: From<T> + Serialize,
{
    let raw: Vec<T> = from_upstream(body)?;
    let items: Vec<U> = raw.into_iter().map(U::from).collect();
    Ok(serde_json::to_value(items)?)
}

/// Deserialize an upstream body, reporting shape mismatches as invalid data.
pub fn from_upstream<T: DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body)
        .map_err(|e| Error::InvalidData(format!("Unexpected upstream response: {}", e)))
}
