//! Model Context Protocol (MCP) server.
//!
//! Exposes the management API as tools, resources and prompts to AI agents,
//! speaking newline-delimited JSON-RPC 2.0 over stdio.

mod prompts;
pub mod protocol;
pub mod registry;
mod resources;
mod server;
mod tools;

pub use server::McpServer;
