mod cli;
mod http;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use copper_client::CopperClient;
use copper_core::config::load_dotenv;
use copper_core::Config;
use copper_mcp::{CommandServer, McpServer, StdioTransport};
use copper_tool_runtime::{default_dispatcher, register_crm_tools, Dispatcher, ToolRegistry};

use crate::cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing, so `.env` can feed clap's env-backed flags.
    load_dotenv();
    let args = CliArgs::parse();

    // stdout is the protocol channel, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::from_env();
    if let Some(url) = &args.base_url {
        config.copper.base_url = url.clone();
    }

    match args.command() {
        Command::ListTools => list_tools(),
        Command::Mcp => {
            let dispatcher = build_dispatcher(&config)?;
            McpServer::new(dispatcher)
                .run(&mut StdioTransport::stdio())
                .await
                .context("MCP server failed")
        }
        Command::Commands => {
            let dispatcher = build_dispatcher(&config)?;
            CommandServer::new(dispatcher)
                .run(&mut StdioTransport::stdio())
                .await
                .context("command loop failed")
        }
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
    }
}

fn build_dispatcher(config: &Config) -> Result<Dispatcher> {
    config.log_summary();
    let client = CopperClient::new(&config.copper).context("failed to create Copper client")?;
    default_dispatcher(Arc::new(client)).context("failed to register tools")
}

fn list_tools() -> Result<()> {
    let mut registry = ToolRegistry::new();
    register_crm_tools(&mut registry)?;
    println!("{}", serde_json::to_string_pretty(&registry.list())?);
    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    let dispatcher = build_dispatcher(&config)?;
    let state = Arc::new(http::AppState {
        dispatcher,
        config: config.redacted_summary(),
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, http::router(state)).await?;
    Ok(())
}
