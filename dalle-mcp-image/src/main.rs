//! DALL-E MCP Image Server
//!
//! MCP server for image generation using OpenAI DALL-E 3, served over stdio.

use anyhow::Result;
use clap::Parser;
use dalle_mcp_common::tracing::init_tracing_with_default;
use dalle_mcp_common::{Config, McpServerBuilder};
use dalle_mcp_image::ImageServer;

/// Command-line arguments for the image server.
#[derive(Parser, Debug)]
#[command(name = "dalle-mcp-image")]
#[command(about = "MCP server for image generation using OpenAI DALL-E 3")]
#[command(version)]
struct Args {
    /// Default log filter used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing_with_default(&args.log_level);

    tracing::info!("dalle-mcp-image server starting...");

    // Missing credentials are fatal before any request is served
    let config = Config::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
    })?;
    tracing::info!(
        api_base_url = %config.api_base_url,
        model = %config.model,
        "Configuration loaded"
    );

    let server = ImageServer::new(config);

    McpServerBuilder::new(server).run().await?;

    tracing::info!("Server stopped");
    Ok(())
}
