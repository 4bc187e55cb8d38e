use crate::coordinator::SessionCoordinator;
use nexus_core::{NexusError, ToolCall, ToolResult};
use std::sync::Arc;
use tracing::{info, warn};

/// Names of the tools exposed to the voice agent.
pub const TOOL_NAMES: [&str; 4] = ["change_mode", "end_session", "search_memory", "open_history"];

/// Dispatches agent-invoked client tools onto the coordinator.
pub struct ClientTools {
    coordinator: Arc<SessionCoordinator>,
}

impl ClientTools {
    /// Creates a dispatcher bound to `coordinator`.
    pub fn new(coordinator: Arc<SessionCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Run `call` and produce the text the agent will hear back.
    ///
    /// - `change_mode {mode, topic?}` → switch persona, answers `""`.
    /// - `end_session {}` → save and reset, answers `""`.
    /// - `search_memory {query}` → one-sentence search summary.
    /// - `open_history {}` → raises the history flag.
    pub async fn call(&self, call: ToolCall) -> ToolResult {
        info!(tool = %call.name, call_id = %call.id, "Client tool invoked");

        match call.name.as_str() {
            "change_mode" => {
                let Some(mode) = call.str_arg("mode") else {
                    return missing_arg(&call, "mode");
                };
                let outcome = self.coordinator.switch_mode(mode, call.str_arg("topic")).await;
                info!(?outcome, "change_mode finished");
                ToolResult::success(&call.id, "")
            }
            "end_session" => {
                self.coordinator.end_session().await;
                ToolResult::success(&call.id, "")
            }
            "search_memory" => {
                let Some(query) = call.str_arg("query") else {
                    return missing_arg(&call, "query");
                };
                let answer = self.coordinator.search_memory(query).await;
                ToolResult::success(&call.id, answer)
            }
            "open_history" => ToolResult::success(&call.id, self.coordinator.open_history()),
            other => {
                let err = NexusError::Tool(format!("Unknown tool: {other}"));
                warn!(error = %err, "Unknown client tool");
                ToolResult::error(&call.id, err.to_string())
            }
        }
    }
}

fn missing_arg(call: &ToolCall, name: &str) -> ToolResult {
    let err = NexusError::Tool(format!("{}: missing required argument: {name}", call.name));
    warn!(error = %err, "Rejected tool call");
    ToolResult::error(&call.id, err.to_string())
}
