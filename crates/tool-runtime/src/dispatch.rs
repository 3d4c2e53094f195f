//! Command dispatch: `{tool, args}` in, a status envelope out.

use std::sync::Arc;

use copper_core::CopperError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::registry::ToolRegistry;
use crate::tool::{ToolContext, ToolDefinition, ToolError};

/// A single command. `type` is accepted as an alias for `tool`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    #[serde(alias = "type")]
    pub tool: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub code: String,
    pub message: String,
    pub details: Value,
}

impl From<&ToolError> for ErrorBody {
    fn from(err: &ToolError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            details: err.details(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CommandResponse {
    Success { data: Value },
    Error { error: ErrorBody },
}

impl CommandResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandResponse::Success { .. })
    }
}

impl From<Result<Value, ToolError>> for CommandResponse {
    fn from(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(data) => CommandResponse::Success { data },
            Err(err) => CommandResponse::Error { error: ErrorBody::from(&err) },
        }
    }
}

/// Routes commands to registered tools. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    context: ToolContext,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry, context: ToolContext) -> Self {
        Self {
            registry: Arc::new(registry),
            context,
        }
    }

    pub fn tools(&self) -> Vec<ToolDefinition> {
        self.registry.list()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Run one tool by name.
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::UnknownCommand(name.to_string()))?;

        let args = if args.is_null() { json!({}) } else { args };
        let result = tool.execute(args, &self.context).await;
        match &result {
            Ok(_) => info!(tool = name, "command succeeded"),
            Err(e) => warn!(tool = name, code = e.code(), error = %e, "command failed"),
        }
        result
    }

    pub async fn dispatch_command(&self, command: Command) -> CommandResponse {
        self.execute(&command.tool, command.args).await.into()
    }

    /// Dispatch a raw JSON command. Malformed commands become validation errors.
    pub async fn dispatch(&self, raw: Value) -> CommandResponse {
        match serde_json::from_value::<Command>(raw) {
            Ok(command) => self.dispatch_command(command).await,
            Err(e) => {
                let err: ToolError =
                    CopperError::validation("tool", format!("malformed command: {e}")).into();
                warn!(error = %err, "rejected command");
                CommandResponse::from(Err::<Value, _>(err))
            }
        }
    }
}
