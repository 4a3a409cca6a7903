//! JSON-RPC gateway for the Dev-Server-Workflow MCP adapters.
//!
//! One generic gateway serves every adapter: the envelope validator and
//! dispatcher in [`gateway`], the tool [`registry`] and [`router`], and the
//! axum [`server`]. What differs per adapter is only the tool table and
//! upstream client, selected in [`adapters`].

pub mod adapters;
pub mod context;
pub mod error;
pub mod gateway;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod server;

pub use context::GatewayContext;
pub use error::GatewayError;
pub use registry::Registry;
pub use server::{router as http_router, serve};
