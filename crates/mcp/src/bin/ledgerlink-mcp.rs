// Standalone MCP server binary

use anyhow::Result;
use clap::Parser;
use ledgerlink_mcp::config::{credentials_from_env, McpConfig};
use ledgerlink_mcp::tools::{register_all, ToolRegistry, ToolTier};
use ledgerlink_mcp::McpServer;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ledgerlink-mcp")]
#[command(about = "Ledgerlink accounting API as MCP tools over stdio", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "ledgerlink.toml")]
    config: PathBuf,

    /// Expose only read-only tools
    #[arg(long)]
    read_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerlink=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    tracing::info!("Ledgerlink MCP server starting");

    let config = McpConfig::load(&args.config)?.with_env_overrides(|key| std::env::var(key).ok());
    let credentials = credentials_from_env(|key| std::env::var(key).ok())?;
    let client = config.client(credentials)?;

    let mut registry = ToolRegistry::new();
    register_all(&mut registry, &client);

    if args.read_only || config.read_only {
        registry.retain_tier(ToolTier::Tier0);
        tracing::info!("Read-only mode, write tools disabled");
    }

    tracing::info!(
        tools = registry.len(),
        base_url = %config.base_url,
        "Registered tools"
    );

    McpServer::new(registry).start().await
}
