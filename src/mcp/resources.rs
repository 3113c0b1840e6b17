//! MCP Resources
//!
//! Read-only views onto the management API, addressed by URI.

use serde_json::Value;

use super::protocol::{McpError, ResourceContent};
use super::registry::{
    McpRegistry, RegisteredResource, ResourceBuilder, ResourceResult, ToolContext, UriVariables,
};
use crate::api::ApiError;

const JSON_MIME_TYPE: &str = "application/json";

/// Register all resources with the registry
pub fn register_all_resources(registry: &mut McpRegistry) {
    registry.register_resource(products_resource());
    registry.register_resource(sim_status_resource());
}

fn products_resource() -> RegisteredResource {
    ResourceBuilder::new("resource://1nce/products", "1NCE Products")
        .description("All available 1NCE products")
        .mime_type(JSON_MIME_TYPE)
        .build(products_handler)
}

async fn products_handler(ctx: ToolContext, uri: String, _vars: UriVariables) -> ResourceResult {
    json_contents(uri, ctx.api.list_products().await)
}

fn sim_status_resource() -> RegisteredResource {
    ResourceBuilder::new("resource://1nce/sims/{iccid}/status", "SIM Status")
        .description("Current connection status of a SIM")
        .mime_type(JSON_MIME_TYPE)
        .build(sim_status_handler)
}

async fn sim_status_handler(ctx: ToolContext, uri: String, vars: UriVariables) -> ResourceResult {
    let iccid = vars
        .get("iccid")
        .ok_or_else(|| McpError::InvalidParams("missing ICCID in resource URI".to_string()))?;
    json_contents(uri, ctx.api.get_sim_status(iccid).await)
}

fn json_contents(uri: String, result: Result<Value, ApiError>) -> ResourceResult {
    let value = result.map_err(|err| match err {
        ApiError::InvalidIccid(_) => McpError::InvalidParams(err.to_string()),
        other => {
            tracing::warn!(uri = %uri, "resource read failed: {other}");
            McpError::InternalError(other.to_string())
        }
    })?;

    let text =
        serde_json::to_string_pretty(&value).map_err(|e| McpError::InternalError(e.to_string()))?;
    Ok(vec![ResourceContent {
        uri,
        mime_type: Some(JSON_MIME_TYPE.to_string()),
        text,
    }])
}
