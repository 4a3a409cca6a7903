//! Core types shared by every Dev-Server-Workflow MCP adapter.
//!
//! This crate provides the error type, layered configuration, the upstream
//! REST client and the declarative tool table that adapters fill in.

pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod tool;

pub use config::{AdapterConfig, AdapterKind, Config};
pub use error::{Error, Result};
pub use http::{AuthScheme, RestClient, Upstream, UpstreamRequest};
pub use tool::{Adapter, ToolDescriptor, ToolSpec};
