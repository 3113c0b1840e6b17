//! MCP Prompts

use super::registry::{McpRegistry, PromptBuilder};

/// Register all prompts with the registry
pub fn register_all_prompts(registry: &mut McpRegistry) {
    registry.register_prompt(
        PromptBuilder::new("check_sim_status_prompt")
            .description("Ask for a SIM's activity, data usage and quota expiry")
            .argument("iccid", "The ICCID of the SIM to check", true)
            .build(|args| {
                format!(
                    "Please check the status of SIM with ICCID {} and let me know if it's active, \
                     what its current data usage is, and when its quota expires.",
                    args["iccid"]
                )
            }),
    );

    registry.register_prompt(
        PromptBuilder::new("order_status_prompt")
            .description("Ask for an order's placement date, products and status")
            .argument("order_number", "The order number to check", true)
            .build(|args| {
                format!(
                    "Please check the status of order #{} and let me know when it was placed, \
                     what products were ordered, and what the current status is.",
                    args["order_number"]
                )
            }),
    );
}
