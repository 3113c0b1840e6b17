mod api;
mod config;
mod mcp;
mod oauth;
#[cfg(test)]
mod test_support;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::api::ApiClient;
use crate::config::Config;
use crate::mcp::McpServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Stdout carries protocol messages, so all logging goes to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    // Without credentials there is nothing we can serve, so stop before touching the network.
    let config = Config::from_env().context("unable to load configuration")?;
    tracing::info!(
        api_url = %config.api_url,
        client_id = %config.credentials.client_id,
        "loaded configuration"
    );

    let api = ApiClient::from_config(&config).context("unable to create HTTP client")?;
    McpServer::new(api)
        .run_stdio()
        .await
        .context("MCP transport failed")?;

    tracing::info!("shutting down");
    Ok(())
}
