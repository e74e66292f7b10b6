//! Daemon entry point for the Finnhub MCP server.
//!
//! Loads configuration from the CLI and environment, assembles the tool
//! catalog, and serves the MCP protocol over stdio or streamable HTTP.

mod config;

use finnhub_core::{Catalog, RestAdapter};
use finnhub_mcp::FinnhubMcp;
use finnhub_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::FinnhubConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // stdout carries MCP frames in stdio mode.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = FinnhubConfig::from_args()?;
    let catalog = build_catalog(&config)?;
    if config.api.auth_token.is_some() {
        warn!("FINNHUB_API_TOKEN is set but no configured endpoint sends credentials");
    }
    info!(
        base_url = %config.api.base_url,
        query_encoding = %config.api.query_encoding,
        tools = catalog.len(),
        "starting finnhub-mcpd"
    );

    let adapter = RestAdapter::new(config.api.clone())?;
    let service = FinnhubMcp::new(&catalog, &adapter);

    if config.enable_stdio {
        return serve_stdio(service).await;
    }
    if config.mcp_serve {
        let http = McpHttpServerConfig::new(config.mcp_http_addr)
            .with_stateful_mode(config.mcp_stateful)
            .with_sse_keep_alive(config.mcp_sse_keep_alive);
        serve_streamable_http(service, http).await?;
    }
    Ok(())
}

fn build_catalog(
    config: &FinnhubConfig,
) -> Result<Catalog, Box<dyn std::error::Error + Send + Sync>> {
    let mut catalog = Catalog::builtin();
    if let Some(path) = &config.catalog {
        let overlay = Catalog::load(path)?;
        info!(path = %path.display(), tools = overlay.len(), "loaded catalog overlay");
        catalog = catalog.merge(overlay);
    }
    if !config.tools.is_empty() {
        catalog = catalog.retain_named(&config.tools)?;
    }
    Ok(catalog)
}
