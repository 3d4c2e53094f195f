//! MCP and raw-command front ends for the Copper adapter.
//!
//! - **types**: JSON-RPC 2.0 and MCP message types
//! - **transport**: newline-delimited transports (stdio, channels)
//! - **server**: MCP server over the tool dispatcher
//! - **commands**: `{tool, args}` command loop over the same transports
//!
//! ```no_run
//! use std::sync::Arc;
//! use copper_client::CopperClient;
//! use copper_core::Config;
//! use copper_mcp::{McpServer, StdioTransport};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env();
//! let client = CopperClient::new(&config.copper)?;
//! let dispatcher = copper_tool_runtime::default_dispatcher(Arc::new(client))?;
//! McpServer::new(dispatcher).run(&mut StdioTransport::stdio()).await?;
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod error;
pub mod server;
pub mod transport;
pub mod types;

pub use commands::CommandServer;
pub use error::McpError;
pub use server::McpServer;
pub use transport::{ChannelTransport, LineTransport, McpTransport, StdioTransport};
pub use types::*;
