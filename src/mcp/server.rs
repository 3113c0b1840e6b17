use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use super::protocol::{JsonRpcRequest, JsonRpcResponse, McpError, MCP_PROTOCOL_VERSION};
use super::registry::{parse_params, McpRegistry, ToolContext};
use super::{prompts, resources, tools};
use crate::api::ApiClient;

/// Human-readable name reported during initialization.
const SERVER_NAME: &str = "1NCE IoT Platform MCP";

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct ResourceReadParams {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct PromptGetParams {
    name: String,
    #[serde(default)]
    arguments: HashMap<String, String>,
}

pub struct McpServer {
    registry: McpRegistry,
    ctx: ToolContext,
}

impl McpServer {
    /// Creates a server exposing every tool, resource and prompt over the given API client.
    pub fn new(api: ApiClient) -> Self {
        let mut registry = McpRegistry::new();
        tools::register_all_tools(&mut registry);
        resources::register_all_resources(&mut registry);
        prompts::register_all_prompts(&mut registry);

        Self {
            registry,
            ctx: ToolContext { api: Arc::new(api) },
        }
    }

    /// Handles a single line of input.
    /// Returns `None` for notifications, which never receive a response.
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(err) => {
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    McpError::ParseError(err.to_string()),
                ))
            }
        };
        self.handle_request(request).await
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "received notification");
            return None;
        }
        let id = request.id.unwrap_or(Value::Null);

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::failure(
                id,
                McpError::InvalidRequest(format!(
                    "unsupported jsonrpc version {}",
                    request.jsonrpc
                )),
            ));
        }

        let response = match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => {
                tracing::debug!(method = %request.method, "request failed: {err}");
                JsonRpcResponse::failure(id, err)
            }
        };
        Some(response)
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<Value, McpError> {
        match method {
            "initialize" => Ok(initialize_result()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.registry.list_tools()),
            "tools/call" => {
                let params: ToolCallParams = parse_params(params)?;
                let result = self
                    .registry
                    .call_tool(self.ctx.clone(), &params.name, params.arguments)
                    .await?;
                serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
            }
            "resources/list" => Ok(self.registry.list_resources()),
            "resources/templates/list" => Ok(self.registry.list_resource_templates()),
            "resources/read" => {
                let params: ResourceReadParams = parse_params(params)?;
                let contents = self
                    .registry
                    .read_resource(self.ctx.clone(), &params.uri)
                    .await?;
                Ok(json!({ "contents": contents }))
            }
            "prompts/list" => Ok(self.registry.list_prompts()),
            "prompts/get" => {
                let params: PromptGetParams = parse_params(params)?;
                self.registry.get_prompt(&params.name, &params.arguments)
            }
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }

    /// Serves requests from `reader` until EOF, writing responses to `writer`.
    ///
    /// Every request runs on its own task, so slow API calls don't hold up others.
    /// Responses are written in completion order by a single writer task.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
        let writer_task = tokio::spawn(write_responses(rx, writer));

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let server = Arc::clone(&self);
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = server.handle_message(&line).await {
                    // The writer only goes away once every sender has been dropped.
                    let _ = tx.send(response);
                }
            });
        }

        tracing::info!("input closed, finishing outstanding requests");
        drop(tx);
        writer_task.await.map_err(io::Error::other)?
    }

    /// Serves requests over stdin and stdout.
    pub async fn run_stdio(self) -> io::Result<()> {
        tracing::info!("serving MCP over stdio");
        Arc::new(self)
            .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }
}

async fn write_responses<W>(
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
    mut writer: W,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut frame = match serde_json::to_string(&response) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::error!("unable to serialize response: {err}");
                continue;
            }
        };
        frame.push('\n');
        writer.write_all(frame.as_bytes()).await?;
        writer.flush().await?;
    }
    writer.shutdown().await
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": MCP_PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": false },
            "resources": { "subscribe": false, "listChanged": false },
            "prompts": { "listChanged": false },
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}
