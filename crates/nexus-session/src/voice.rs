//! The seam to the external conversational-voice SDK.
//!
//! Nexus never touches audio: the provider captures speech, runs the agent
//! and reports back through [`VoiceEvent`]s and client tool calls.

use async_trait::async_trait;
use nexus_core::NexusResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Connection state as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// No session.
    #[default]
    Disconnected,
    /// A connect request is being negotiated.
    Connecting,
    /// Live: audio flows both ways.
    Connected,
    /// The session is being closed.
    Disconnecting,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnecting => "disconnecting",
        };
        f.write_str(s)
    }
}

/// Variables injected into the agent prompt on connect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicVariables {
    /// Conversation subject.
    pub topic: String,
    /// Notes retrieved for the subject.
    pub user_context: String,
}

/// Arguments of a connect request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOptions {
    /// Provider-side agent to connect to.
    pub agent_id: String,
    /// Handoff variables; omitted on manual connects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_variables: Option<DynamicVariables>,
}

/// Events the provider delivers while a session is live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    /// A connection has been established.
    Connected,
    /// The connection is gone.
    Disconnected,
    /// One transcribed turn. `source` is `"ai"` for the agent.
    Message {
        /// Who spoke, as the provider names it.
        source: String,
        /// Transcribed text.
        message: String,
    },
    /// Provider-side failure that did not surface through a call.
    Error(String),
}

/// Connect/disconnect surface of the voice SDK.
#[async_trait]
pub trait VoiceSession: Send + Sync {
    /// Open a session with the given agent.
    async fn start_session(&self, options: StartOptions) -> NexusResult<()>;

    /// Close the current session, if any.
    async fn end_session(&self) -> NexusResult<()>;

    /// Current connection status.
    fn status(&self) -> ConnectionStatus;

    /// Whether the agent is currently speaking.
    fn is_speaking(&self) -> bool;
}

/// Microphone permission prompt.
#[async_trait]
pub trait AudioPermission: Send + Sync {
    /// Resolve `Ok` when access is granted, [`nexus_core::NexusError::Permission`] otherwise.
    async fn request_microphone(&self) -> NexusResult<()>;
}

/// User-visible, blocking notifications.
pub trait Notifier: Send + Sync {
    /// Show `message` to the user.
    fn alert(&self, message: &str);
}

/// Permission source for hosts without a prompt (terminals, tests).
pub struct GrantedMicrophone;

#[async_trait]
impl AudioPermission for GrantedMicrophone {
    async fn request_microphone(&self) -> NexusResult<()> {
        Ok(())
    }
}

/// Notifier that only logs.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        warn!(alert = message, "User alert");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_start_options_wire_shape() {
        let opts = StartOptions {
            agent_id: "agent-1".into(),
            dynamic_variables: Some(DynamicVariables {
                topic: "drones".into(),
                user_context: "".into(),
            }),
        };
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "agentId": "agent-1",
                "dynamicVariables": {"topic": "drones", "user_context": ""}
            })
        );

        let bare = StartOptions {
            agent_id: "agent-1".into(),
            dynamic_variables: None,
        };
        assert_eq!(
            serde_json::to_value(&bare).unwrap(),
            serde_json::json!({"agentId": "agent-1"})
        );
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ConnectionStatus::default().to_string(), "disconnected");
        assert_eq!(ConnectionStatus::Disconnecting.to_string(), "disconnecting");
    }
}
