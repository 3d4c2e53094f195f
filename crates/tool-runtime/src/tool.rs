use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use copper_client::{ApiError, CrmBackend};
use copper_core::CopperError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Describes a tool's interface for MCP clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name (e.g., "get_person", "search_companies")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema describing the expected arguments
    pub input_schema: Value,
}

/// Context passed to tool execution. Owns the CRM backend for the process.
#[derive(Clone)]
pub struct ToolContext {
    pub backend: Arc<dyn CrmBackend>,
}

impl ToolContext {
    pub fn new(backend: Arc<dyn CrmBackend>) -> Self {
        Self { backend }
    }
}

/// The primary extension point: all tools implement this trait.
///
/// Tools are object-safe, Send + Sync, and async. The returned value is the
/// `data` of a success envelope.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's definition (name, description, JSON Schema).
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given JSON arguments.
    async fn execute(&self, args: Value, context: &ToolContext) -> Result<Value, ToolError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    Copper(#[from] CopperError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

impl ToolError {
    /// Error type code for the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::Copper(e) => e.code(),
            ToolError::Api(e) => e.code(),
            ToolError::UnknownCommand(_) => "UNKNOWN_COMMAND",
        }
    }

    pub fn details(&self) -> Value {
        match self {
            ToolError::Copper(e) => e.details(),
            ToolError::Api(e) => e.details(),
            ToolError::UnknownCommand(name) => json!({ "command": name }),
        }
    }
}

impl fmt::Display for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.description)
    }
}
