//! MCP Tools
//!
//! One tool per management API operation.

mod orders;
mod products;
mod sims;

use super::registry::McpRegistry;

/// Register all tools with the registry
pub fn register_all_tools(registry: &mut McpRegistry) {
    products::register_tools(registry);
    orders::register_tools(registry);
    sims::register_tools(registry);
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}
