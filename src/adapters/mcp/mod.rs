//! MCP (Model Context Protocol) adapter.
//!
//! Exposes the entity coordinator's operations as native tools for AI
//! agents over a stdio JSON-RPC transport.

pub mod stdio_server;

pub use stdio_server::StdioServer;
