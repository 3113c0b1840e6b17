//! Declarative registry of the tools, resources and prompts we expose.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::protocol::{McpError, PromptMessage, ResourceContent, ToolsCallResult};
use crate::api::{ApiClient, ApiError};

pub type ToolResult = Result<ToolsCallResult, McpError>;
pub type ResourceResult = Result<Vec<ResourceContent>, McpError>;

/// Variables captured from a resource URI template, e.g. `iccid`.
pub type UriVariables = HashMap<String, String>;

type ToolHandler = Box<dyn Fn(ToolContext, Value) -> BoxFuture<'static, ToolResult> + Send + Sync>;
type ResourceHandler = Box<
    dyn Fn(ToolContext, String, UriVariables) -> BoxFuture<'static, ResourceResult> + Send + Sync,
>;
type PromptHandler = Box<dyn Fn(&HashMap<String, String>) -> String + Send + Sync>;

/// Everything a handler may use. Cheap to clone.
#[derive(Clone)]
pub struct ToolContext {
    pub api: Arc<ApiClient>,
}

/// Deserializes tool arguments, treating missing arguments as an empty object.
pub fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, McpError> {
    let params = if params.is_null() { json!({}) } else { params };
    serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
}

/// Turns an API outcome into a tool result.
///
/// Downstream failures are reported to the agent as a failed call, while a
/// malformed ICCID is the caller's mistake and becomes a protocol error.
pub fn api_tool_result(result: Result<Value, ApiError>) -> ToolResult {
    match result {
        Ok(value) => {
            ToolsCallResult::json(&value).map_err(|e| McpError::InternalError(e.to_string()))
        }
        Err(ApiError::InvalidIccid(iccid)) => Err(McpError::InvalidParams(format!(
            "invalid ICCID {iccid:?}: expected only letters and digits"
        ))),
        Err(err) => {
            tracing::warn!("API call failed: {err}");
            Ok(ToolsCallResult::error(err.to_string()))
        }
    }
}

// ============================================================================
// Tools
// ============================================================================

pub struct RegisteredTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    handler: ToolHandler,
}

pub struct ToolBuilder {
    name: String,
    description: String,
    input_schema: Value,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            input_schema: json!({ "type": "object", "properties": {} }),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn build<F, Fut>(self, handler: F) -> RegisteredTool
    where
        F: Fn(ToolContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        RegisteredTool {
            name: self.name,
            description: self.description,
            input_schema: self.input_schema,
            handler: Box::new(move |ctx, params| handler(ctx, params).boxed()),
        }
    }
}

// ============================================================================
// Resources
// ============================================================================

pub struct RegisteredResource {
    /// Either a concrete URI, or a template with `{name}` path segments.
    pub uri_template: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
    handler: ResourceHandler,
}

impl RegisteredResource {
    pub fn is_template(&self) -> bool {
        self.uri_template.contains('{')
    }
}

pub struct ResourceBuilder {
    uri_template: String,
    name: String,
    description: String,
    mime_type: String,
}

impl ResourceBuilder {
    pub fn new(uri_template: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri_template: uri_template.into(),
            name: name.into(),
            description: String::new(),
            mime_type: "application/json".to_string(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn build<F, Fut>(self, handler: F) -> RegisteredResource
    where
        F: Fn(ToolContext, String, UriVariables) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResourceResult> + Send + 'static,
    {
        RegisteredResource {
            uri_template: self.uri_template,
            name: self.name,
            description: self.description,
            mime_type: self.mime_type,
            handler: Box::new(move |ctx, uri, vars| handler(ctx, uri, vars).boxed()),
        }
    }
}

/// Matches `uri` against a template made of literal and `{name}` path segments.
pub fn match_uri_template(template: &str, uri: &str) -> Option<UriVariables> {
    let mut variables = UriVariables::new();
    let mut template_segments = template.split('/');
    let mut uri_segments = uri.split('/');

    loop {
        match (template_segments.next(), uri_segments.next()) {
            (None, None) => return Some(variables),
            (Some(expected), Some(actual)) => {
                match expected.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(name) if !actual.is_empty() => {
                        variables.insert(name.to_string(), actual.to_string());
                    }
                    Some(_) => return None,
                    None if expected == actual => {}
                    None => return None,
                }
            }
            _ => return None,
        }
    }
}

// ============================================================================
// Prompts
// ============================================================================

pub struct PromptArgument {
    pub name: String,
    pub description: String,
    pub required: bool,
}

pub struct RegisteredPrompt {
    pub name: String,
    pub description: String,
    pub arguments: Vec<PromptArgument>,
    handler: PromptHandler,
}

pub struct PromptBuilder {
    name: String,
    description: String,
    arguments: Vec<PromptArgument>,
}

impl PromptBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            arguments: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn argument(mut self, name: &str, description: &str, required: bool) -> Self {
        self.arguments.push(PromptArgument {
            name: name.to_string(),
            description: description.to_string(),
            required,
        });
        self
    }

    pub fn build<F>(self, handler: F) -> RegisteredPrompt
    where
        F: Fn(&HashMap<String, String>) -> String + Send + Sync + 'static,
    {
        RegisteredPrompt {
            name: self.name,
            description: self.description,
            arguments: self.arguments,
            handler: Box::new(handler),
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Default)]
pub struct McpRegistry {
    tools: BTreeMap<String, RegisteredTool>,
    resources: Vec<RegisteredResource>,
    prompts: BTreeMap<String, RegisteredPrompt>,
}

impl McpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_tool(&mut self, tool: RegisteredTool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    pub fn register_resource(&mut self, resource: RegisteredResource) {
        self.resources.push(resource);
    }

    pub fn register_prompt(&mut self, prompt: RegisteredPrompt) {
        self.prompts.insert(prompt.name.clone(), prompt);
    }

    pub fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self
            .tools
            .values()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": tool.input_schema,
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    pub async fn call_tool(&self, ctx: ToolContext, name: &str, arguments: Value) -> ToolResult {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| McpError::InvalidParams(format!("unknown tool: {name}")))?;
        tracing::info!(tool = name, "calling tool");
        (tool.handler)(ctx, arguments).await
    }

    pub fn list_resources(&self) -> Value {
        let resources: Vec<Value> = self
            .resources
            .iter()
            .filter(|resource| !resource.is_template())
            .map(|resource| {
                json!({
                    "uri": resource.uri_template,
                    "name": resource.name,
                    "description": resource.description,
                    "mimeType": resource.mime_type,
                })
            })
            .collect();
        json!({ "resources": resources })
    }

    pub fn list_resource_templates(&self) -> Value {
        let templates: Vec<Value> = self
            .resources
            .iter()
            .filter(|resource| resource.is_template())
            .map(|resource| {
                json!({
                    "uriTemplate": resource.uri_template,
                    "name": resource.name,
                    "description": resource.description,
                    "mimeType": resource.mime_type,
                })
            })
            .collect();
        json!({ "resourceTemplates": templates })
    }

    pub async fn read_resource(&self, ctx: ToolContext, uri: &str) -> ResourceResult {
        for resource in &self.resources {
            if let Some(variables) = match_uri_template(&resource.uri_template, uri) {
                tracing::info!(uri, "reading resource");
                return (resource.handler)(ctx, uri.to_string(), variables).await;
            }
        }
        Err(McpError::ResourceNotFound(uri.to_string()))
    }

    pub fn list_prompts(&self) -> Value {
        let prompts: Vec<Value> = self
            .prompts
            .values()
            .map(|prompt| {
                let arguments: Vec<Value> = prompt
                    .arguments
                    .iter()
                    .map(|arg| {
                        json!({
                            "name": arg.name,
                            "description": arg.description,
                            "required": arg.required,
                        })
                    })
                    .collect();
                json!({
                    "name": prompt.name,
                    "description": prompt.description,
                    "arguments": arguments,
                })
            })
            .collect();
        json!({ "prompts": prompts })
    }

    pub fn get_prompt(
        &self,
        name: &str,
        arguments: &HashMap<String, String>,
    ) -> Result<Value, McpError> {
        let prompt = self
            .prompts
            .get(name)
            .ok_or_else(|| McpError::InvalidParams(format!("unknown prompt: {name}")))?;

        if let Some(missing) = prompt
            .arguments
            .iter()
            .find(|arg| arg.required && !arguments.contains_key(&arg.name))
        {
            return Err(McpError::InvalidParams(format!(
                "missing required argument: {}",
                missing.name
            )));
        }

        let message = PromptMessage::user((prompt.handler)(arguments));
        Ok(json!({
            "description": prompt.description,
            "messages": [message],
        }))
    }
}
