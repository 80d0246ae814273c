//! Adapters: concrete implementations at the system's edges.

pub mod http;
pub mod mcp;
