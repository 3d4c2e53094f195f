//! Tool layer for the Copper adapter: CRM tools, their registry, and the
//! command dispatcher shared by the MCP server, the command loop, and HTTP.

pub mod args;
pub mod crm;
pub mod dispatch;
pub mod registry;
pub mod tool;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

use std::sync::Arc;

use copper_client::CrmBackend;

pub use crm::{register_crm_tools, EntityActivitiesTool, EntityTool, Operation};
pub use dispatch::{Command, CommandResponse, Dispatcher, ErrorBody};
pub use registry::{RegistryError, ToolRegistry};
pub use tool::{Tool, ToolContext, ToolDefinition, ToolError};

/// Dispatcher with every CRM tool registered against `backend`.
pub fn default_dispatcher(backend: Arc<dyn CrmBackend>) -> Result<Dispatcher, RegistryError> {
    let mut registry = ToolRegistry::new();
    register_crm_tools(&mut registry)?;
    Ok(Dispatcher::new(registry, ToolContext::new(backend)))
}
