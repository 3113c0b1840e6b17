//! Order Tools

use serde::Deserialize;
use serde_json::Value;

use super::{default_page, default_page_size};
use crate::api::NewOrder;
use crate::mcp::registry::{
    api_tool_result, parse_params, McpRegistry, RegisteredTool, ToolBuilder, ToolContext,
    ToolResult,
};

/// Register order tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(get_all_orders_tool());
    registry.register_tool(get_order_by_number_tool());
    registry.register_tool(create_order_tool());
}

// ============================================================================
// get_all_orders
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetAllOrdersParams {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
    #[serde(default = "default_order_sort")]
    sort: String,
}

fn default_order_sort() -> String {
    "order_number".to_string()
}

fn get_all_orders_tool() -> RegisteredTool {
    ToolBuilder::new("get_all_orders")
        .description("Retrieve all orders for the current account, one page at a time")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "page": {
                    "type": "integer",
                    "minimum": 1,
                    "default": 1,
                    "description": "Page number to retrieve, starting at 1"
                },
                "page_size": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 10,
                    "default": 10,
                    "description": "Orders per page (at most 10)"
                },
                "sort": {
                    "type": "string",
                    "default": "order_number",
                    "description": "Comma-separated sort fields, e.g. 'order_status,order_date'"
                }
            }
        }))
        .build(get_all_orders_handler)
}

async fn get_all_orders_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: GetAllOrdersParams = parse_params(params)?;
    api_tool_result(
        ctx.api
            .list_orders(params.page, params.page_size, &params.sort)
            .await,
    )
}

// ============================================================================
// get_order_by_number
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetOrderParams {
    order_number: u64,
}

fn get_order_by_number_tool() -> RegisteredTool {
    ToolBuilder::new("get_order_by_number")
        .description(
            "Retrieve a single order by its order number, including products, shipping address and status",
        )
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "order_number": {
                    "type": "integer",
                    "description": "The unique order number"
                }
            },
            "required": ["order_number"]
        }))
        .build(get_order_by_number_handler)
}

async fn get_order_by_number_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: GetOrderParams = parse_params(params)?;
    api_tool_result(ctx.api.get_order(params.order_number).await)
}

// ============================================================================
// create_order
// ============================================================================

fn create_order_tool() -> RegisteredTool {
    ToolBuilder::new("create_order")
        .description("Place a new order for 1NCE products")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "products": {
                    "type": "array",
                    "description": "Products to order, e.g. [{\"productId\": 1001, \"quantity\": 5}]",
                    "items": { "type": "object" }
                },
                "delivery_address": {
                    "type": "object",
                    "description": "Optional shipping address"
                },
                "customer_reference": {
                    "type": "string",
                    "description": "Optional reference identifier for this order"
                }
            },
            "required": ["products"]
        }))
        .build(create_order_handler)
}

async fn create_order_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let order: NewOrder = parse_params(params)?;
    api_tool_result(ctx.api.create_order(&order).await)
}
