//! Product Tools

use serde_json::Value;

use crate::mcp::registry::{
    api_tool_result, McpRegistry, RegisteredTool, ToolBuilder, ToolContext, ToolResult,
};

/// Register product tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(get_all_products_tool());
}

fn get_all_products_tool() -> RegisteredTool {
    ToolBuilder::new("get_all_products")
        .description(
            "Retrieve all available 1NCE products, including pricing, package sizes and specifications",
        )
        .build(get_all_products_handler)
}

async fn get_all_products_handler(ctx: ToolContext, _params: Value) -> ToolResult {
    api_tool_result(ctx.api.list_products().await)
}
