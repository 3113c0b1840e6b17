//! SIM Tools
//!
//! Listing, inspecting, updating and resetting SIMs by ICCID.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{default_page, default_page_size};
use crate::api::{ApiError, SimFilter, SimStatus, SimUpdate, DATE_FORMAT};
use crate::mcp::protocol::{McpError, ToolsCallResult};
use crate::mcp::registry::{
    api_tool_result, parse_params, McpRegistry, RegisteredTool, ToolBuilder, ToolContext,
    ToolResult,
};

/// Register SIM tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(get_all_sims_tool());
    registry.register_tool(get_sim_details_tool());
    registry.register_tool(get_sim_status_tool());
    registry.register_tool(get_sim_data_quota_tool());
    registry.register_tool(get_sim_sms_quota_tool());
    registry.register_tool(update_sim_status_tool());
    registry.register_tool(get_sim_usage_tool());
    registry.register_tool(get_sim_events_tool());
    registry.register_tool(reset_sim_connectivity_tool());
}

fn iccid_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "iccid": {
                "type": "string",
                "description": "The ICCID of the SIM"
            }
        },
        "required": ["iccid"]
    })
}

#[derive(Debug, Deserialize)]
struct IccidParams {
    iccid: String,
}

// ============================================================================
// get_all_sims
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetAllSimsParams {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    sort: Option<String>,
}

fn get_all_sims_tool() -> RegisteredTool {
    ToolBuilder::new("get_all_sims")
        .description(
            "List the account's SIMs with pagination, filtering and sorting, including status, IP address and activation details",
        )
        .input_schema(json!({
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
                    "maximum": 100,
                    "default": 10,
                    "description": "SIMs per page (at most 100)"
                },
                "query": {
                    "type": "string",
                    "description": "Filter as 'field:value' pairs, e.g. 'imei:12345,ip_address:10.0.0.1'"
                },
                "sort": {
                    "type": "string",
                    "description": "Comma-separated sort fields, '-' for descending, e.g. 'ip_address,-imei'"
                }
            }
        }))
        .build(get_all_sims_handler)
}

async fn get_all_sims_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: GetAllSimsParams = parse_params(params)?;
    let filter = SimFilter {
        query: params.query,
        sort: params.sort,
    };
    api_tool_result(
        ctx.api
            .list_sims(params.page, params.page_size, &filter)
            .await,
    )
}

// ============================================================================
// Single-SIM lookups
// ============================================================================

fn get_sim_details_tool() -> RegisteredTool {
    ToolBuilder::new("get_sim_details")
        .description(
            "Retrieve details of a SIM by ICCID: activation status, IP address, quotas and more",
        )
        .input_schema(iccid_schema())
        .build(get_sim_details_handler)
}

async fn get_sim_details_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: IccidParams = parse_params(params)?;
    api_tool_result(ctx.api.get_sim(&params.iccid).await)
}

fn get_sim_status_tool() -> RegisteredTool {
    ToolBuilder::new("get_sim_status")
        .description(
            "Get the connection status of a SIM: whether it is online, attached or offline, and its current network",
        )
        .input_schema(iccid_schema())
        .build(get_sim_status_handler)
}

async fn get_sim_status_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: IccidParams = parse_params(params)?;
    api_tool_result(ctx.api.get_sim_status(&params.iccid).await)
}

fn get_sim_data_quota_tool() -> RegisteredTool {
    ToolBuilder::new("get_sim_data_quota")
        .description("Retrieve a SIM's data quota: total and remaining volume, and expiry date")
        .input_schema(iccid_schema())
        .build(get_sim_data_quota_handler)
}

async fn get_sim_data_quota_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: IccidParams = parse_params(params)?;
    api_tool_result(ctx.api.get_sim_data_quota(&params.iccid).await)
}

fn get_sim_sms_quota_tool() -> RegisteredTool {
    ToolBuilder::new("get_sim_sms_quota")
        .description("Retrieve a SIM's SMS quota: total and remaining messages, and expiry date")
        .input_schema(iccid_schema())
        .build(get_sim_sms_quota_handler)
}

async fn get_sim_sms_quota_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: IccidParams = parse_params(params)?;
    api_tool_result(ctx.api.get_sim_sms_quota(&params.iccid).await)
}

// ============================================================================
// update_sim_status
// ============================================================================

#[derive(Debug, Deserialize)]
struct UpdateSimStatusParams {
    iccid: String,
    status: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    imei_lock: Option<bool>,
}

fn update_sim_status_tool() -> RegisteredTool {
    ToolBuilder::new("update_sim_status")
        .description("Enable or disable a SIM, optionally changing its label or IMEI lock")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "iccid": {
                    "type": "string",
                    "description": "The ICCID of the SIM to update"
                },
                "status": {
                    "type": "string",
                    "enum": ["Enabled", "Disabled"],
                    "description": "New status for the SIM"
                },
                "label": {
                    "type": "string",
                    "description": "Optional new label"
                },
                "imei_lock": {
                    "type": "boolean",
                    "description": "Optionally enable or disable IMEI locking"
                }
            },
            "required": ["iccid", "status"]
        }))
        .build(update_sim_status_handler)
}

fn parse_status(status: &str) -> Result<SimStatus, McpError> {
    match status {
        "Enabled" => Ok(SimStatus::Enabled),
        "Disabled" => Ok(SimStatus::Disabled),
        _ => Err(McpError::InvalidParams(
            "Status must be either 'Enabled' or 'Disabled'".to_string(),
        )),
    }
}

async fn update_sim_status_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: UpdateSimStatusParams = parse_params(params)?;
    let update = SimUpdate {
        status: parse_status(&params.status)?,
        label: params.label,
        imei_lock: params.imei_lock,
    };

    let outcome = ctx.api.update_sim(&params.iccid, &update).await;
    acknowledge(
        outcome,
        format!("SIM {} updated successfully", params.iccid),
    )
}

// ============================================================================
// get_sim_usage
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetSimUsageParams {
    iccid: String,
    start_date: String,
    end_date: String,
}

fn get_sim_usage_tool() -> RegisteredTool {
    ToolBuilder::new("get_sim_usage")
        .description("Retrieve daily usage statistics for a SIM over a date range")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "iccid": {
                    "type": "string",
                    "description": "The ICCID of the SIM"
                },
                "start_date": {
                    "type": "string",
                    "format": "date",
                    "description": "Start date, YYYY-MM-DD"
                },
                "end_date": {
                    "type": "string",
                    "format": "date",
                    "description": "End date, YYYY-MM-DD"
                }
            },
            "required": ["iccid", "start_date", "end_date"]
        }))
        .build(get_sim_usage_handler)
}

fn parse_date(date: &str) -> Result<NaiveDate, McpError> {
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| McpError::InvalidParams("Dates must be in YYYY-MM-DD format".to_string()))
}

async fn get_sim_usage_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: GetSimUsageParams = parse_params(params)?;
    let start = parse_date(&params.start_date)?;
    let end = parse_date(&params.end_date)?;
    api_tool_result(ctx.api.get_sim_usage(&params.iccid, start, end).await)
}

// ============================================================================
// get_sim_events
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetSimEventsParams {
    iccid: String,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
    #[serde(default = "default_events_sort")]
    sort: String,
}

fn default_events_sort() -> String {
    "-timestamp".to_string()
}

fn get_sim_events_tool() -> RegisteredTool {
    ToolBuilder::new("get_sim_events")
        .description(
            "Retrieve events for a SIM, such as status changes and connections, newest first by default",
        )
        .input_schema(json!({
            "type": "object",
            "properties": {
                "iccid": {
                    "type": "string",
                    "description": "The ICCID of the SIM"
                },
                "page": {
                    "type": "integer",
                    "minimum": 1,
                    "default": 1,
                    "description": "Page number to retrieve, starting at 1"
                },
                "page_size": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 1000,
                    "default": 10,
                    "description": "Events per page (at most 1000)"
                },
                "sort": {
                    "type": "string",
                    "default": "-timestamp",
                    "description": "Sort order; '-timestamp' lists newest events first"
                }
            },
            "required": ["iccid"]
        }))
        .build(get_sim_events_handler)
}

async fn get_sim_events_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: GetSimEventsParams = parse_params(params)?;
    api_tool_result(
        ctx.api
            .get_sim_events(&params.iccid, params.page, params.page_size, &params.sort)
            .await,
    )
}

// ============================================================================
// reset_sim_connectivity
// ============================================================================

fn reset_sim_connectivity_tool() -> RegisteredTool {
    ToolBuilder::new("reset_sim_connectivity")
        .description("Trigger a connectivity reset for a SIM")
        .input_schema(iccid_schema())
        .build(reset_sim_connectivity_handler)
}

async fn reset_sim_connectivity_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: IccidParams = parse_params(params)?;
    let outcome = ctx.api.reset_sim_connectivity(&params.iccid).await;
    acknowledge(
        outcome,
        format!("Connectivity reset triggered for SIM {}", params.iccid),
    )
}

/// Replaces a successful response body with a short confirmation.
fn acknowledge(outcome: Result<Value, ApiError>, message: String) -> ToolResult {
    match outcome {
        Ok(_) => ToolsCallResult::json(&json!({ "success": true, "message": message }))
            .map_err(|e| McpError::InternalError(e.to_string())),
        Err(err) => api_tool_result(Err(err)),
    }
}
