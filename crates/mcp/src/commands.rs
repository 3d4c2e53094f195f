//! Raw command loop: one `{tool, args}` object per line in, one response
//! envelope per line out. No JSON-RPC framing.

use copper_core::CopperError;
use copper_tool_runtime::{CommandResponse, Dispatcher, ToolError};
use serde_json::Value;

use crate::error::McpError;
use crate::transport::McpTransport;

pub struct CommandServer {
    dispatcher: Dispatcher,
}

impl CommandServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub async fn run<T: McpTransport>(&self, transport: &mut T) -> Result<(), McpError> {
        tracing::info!("Command loop starting");
        let mut handled = 0usize;

        while let Some(line) = transport.receive().await? {
            let response = self.handle_line(&line).await;
            transport.send(&serde_json::to_string(&response)?).await?;
            handled += 1;
        }

        tracing::info!(handled, "Command stream closed");
        Ok(())
    }

    pub async fn handle_line(&self, line: &str) -> CommandResponse {
        match serde_json::from_str::<Value>(line) {
            Ok(raw) => self.dispatcher.dispatch(raw).await,
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable command line");
                let err = ToolError::from(CopperError::validation("command", format!("invalid JSON: {e}")));
                CommandResponse::from(Err::<Value, _>(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use copper_core::EntityKind;
    use copper_tool_runtime::default_dispatcher;
    use copper_tool_runtime::mock::MemoryBackend;
    use serde_json::json;

    use super::*;
    use crate::transport::ChannelTransport;

    #[tokio::test]
    async fn answers_each_line_in_order() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert(EntityKind::Person, json!({ "id": 1, "name": "Jane Doe", "emails": [{ "email": "jane@acme.com" }] }));
        let server = CommandServer::new(default_dispatcher(backend).unwrap());

        let (mut client, mut server_side) = ChannelTransport::pair();
        let handle = tokio::spawn(async move { server.run(&mut server_side).await });

        client.send(r#"{"tool":"get_person","args":{"person_id":1}}"#).await.unwrap();
        client.send("not json").await.unwrap();
        client.send(r#"{"type":"delete_person","args":{"id":1}}"#).await.unwrap();

        let first: Value = serde_json::from_str(&client.receive().await.unwrap().unwrap()).unwrap();
        assert_eq!(first["status"], "success");
        assert_eq!(first["data"]["attributes"]["email"], "jane@acme.com");

        let second: Value = serde_json::from_str(&client.receive().await.unwrap().unwrap()).unwrap();
        assert_eq!(second["error"]["type"], "VALIDATION_ERROR");
        assert_eq!(second["error"]["details"]["field"], "command");

        let third: Value = serde_json::from_str(&client.receive().await.unwrap().unwrap()).unwrap();
        assert_eq!(third["data"]["deleted"], true);

        drop(client);
        handle.await.unwrap().unwrap();
    }
}
