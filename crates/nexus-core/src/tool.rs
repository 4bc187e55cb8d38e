use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A request from the voice agent to invoke one of the client tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier assigned by the provider (or generated locally).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON arguments to pass to the tool.
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Creates a call with a freshly generated id.
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            arguments,
        }
    }

    /// Reads a string argument, treating blank values as absent.
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.arguments[key]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// The result handed back to the agent after executing a [`ToolCall`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The ID of the [`ToolCall`] this result corresponds to.
    pub call_id: String,
    /// The textual output the agent will read.
    pub content: String,
    /// Whether the tool execution ended in an error.
    pub is_error: bool,
}

impl ToolResult {
    /// Creates a successful tool result.
    pub fn success(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Creates an error tool result.
    pub fn error(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_str_arg_skips_blank() {
        let call = ToolCall::new(
            "change_mode",
            serde_json::json!({"mode": "debate", "topic": "   "}),
        );
        assert_eq!(call.str_arg("mode"), Some("debate"));
        assert_eq!(call.str_arg("topic"), None);
        assert_eq!(call.str_arg("missing"), None);
    }

    #[test]
    fn test_arguments_default_when_missing() {
        let call: ToolCall =
            serde_json::from_str(r#"{"id": "c1", "name": "end_session"}"#).unwrap();
        assert!(call.arguments.is_null());
        assert_eq!(call.str_arg("mode"), None);
    }
}
