//! Tool registry: the adapter's tool table with compiled parameter schemas.

use std::collections::HashSet;

use dsw_core::{Adapter, AdapterKind, Error, Result, ToolDescriptor, ToolSpec};
use jsonschema::Validator;
use serde_json::Value;

/// A tool together with its compiled argument validator.
pub struct RegisteredTool {
    pub spec: ToolSpec,
    validator: Validator,
}

impl RegisteredTool {
    /// Every schema violation in `arguments`, as `<path>: <message>`.
    pub fn violations(&self, arguments: &Value) -> Vec<String> {
        self.validator
            .iter_errors(arguments)
            .map(|error| {
                let path = error.instance_path.to_string();
                if path.is_empty() {
                    error.to_string()
                } else {
                    format!("{}: {}", path, error)
                }
            })
            .collect()
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

/// Read-only after construction; shared between requests via `Arc`.
#[derive(Debug)]
pub struct Registry {
    kind: AdapterKind,
    tools: Vec<RegisteredTool>,
}

impl Registry {
    /// Compile every tool's schema once. Fails on duplicate tool names or
    /// a schema that is not valid JSON Schema.
    pub fn new(adapter: Adapter) -> Result<Self> {
        let kind = adapter.kind;
        let mut seen = HashSet::new();
        let mut tools = Vec::with_capacity(adapter.tools().len());

        for spec in adapter.tools() {
            if !seen.insert(spec.name().to_string()) {
                return Err(Error::Config(format!("Duplicate tool name: {}", spec.name())));
            }

            let validator = jsonschema::validator_for(&spec.descriptor.parameter_schema)
                .map_err(|e| {
                    Error::Config(format!(
                        "Invalid parameter schema for {}: {}",
                        spec.name(),
                        e
                    ))
                })?;

            tools.push(RegisteredTool {
                spec: spec.clone(),
                validator,
            });
        }

        tracing::debug!(adapter = %kind, tools = tools.len(), "Tool registry built");
        Ok(Self { kind, tools })
    }

    pub fn kind(&self) -> AdapterKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.spec.descriptor.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.spec.name() == name)
    }
}
