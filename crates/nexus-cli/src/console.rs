//! Terminal stand-ins for the voice SDK: typed lines play the part of
//! transcribed speech, connection changes are printed.

use async_trait::async_trait;
use nexus_core::{NexusError, NexusResult};
use nexus_session::{ConnectionStatus, Notifier, StartOptions, VoiceEvent, VoiceSession};
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Simulated voice provider. Events go out on the channel handed to
/// [`ConsoleVoice::new`], the way a real SDK fires its callbacks.
pub struct ConsoleVoice {
    status: Mutex<ConnectionStatus>,
    agent_id: Mutex<Option<String>>,
    events: mpsc::UnboundedSender<VoiceEvent>,
}

impl ConsoleVoice {
    pub fn new(events: mpsc::UnboundedSender<VoiceEvent>) -> Self {
        Self {
            status: Mutex::new(ConnectionStatus::Disconnected),
            agent_id: Mutex::new(None),
            events,
        }
    }

    fn emit(&self, event: VoiceEvent) -> NexusResult<()> {
        self.events
            .send(event)
            .map_err(|e| NexusError::Voice(format!("event channel closed: {e}")))
    }
}

#[async_trait]
impl VoiceSession for ConsoleVoice {
    async fn start_session(&self, options: StartOptions) -> NexusResult<()> {
        *self.status.lock() = ConnectionStatus::Connecting;
        match &options.dynamic_variables {
            Some(vars) => println!(
                "[voice] connecting to {} (topic: {}, context: {} chars)",
                options.agent_id,
                vars.topic,
                vars.user_context.len()
            ),
            None => println!("[voice] connecting to {}", options.agent_id),
        }

        *self.agent_id.lock() = Some(options.agent_id);
        *self.status.lock() = ConnectionStatus::Connected;
        self.emit(VoiceEvent::Connected)
    }

    async fn end_session(&self) -> NexusResult<()> {
        let was = std::mem::replace(&mut *self.status.lock(), ConnectionStatus::Disconnected);
        if was == ConnectionStatus::Disconnected {
            return Ok(());
        }
        if let Some(agent_id) = self.agent_id.lock().take() {
            println!("[voice] disconnected from {agent_id}");
        }
        self.emit(VoiceEvent::Disconnected)
    }

    fn status(&self) -> ConnectionStatus {
        *self.status.lock()
    }

    fn is_speaking(&self) -> bool {
        false
    }
}

/// Alerts go to stderr.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("! {message}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_then_disconnect_emits_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let voice = ConsoleVoice::new(tx);

        voice
            .start_session(StartOptions {
                agent_id: "agent-x".into(),
                dynamic_variables: None,
            })
            .await
            .unwrap();
        assert_eq!(voice.status(), ConnectionStatus::Connected);
        assert_eq!(rx.recv().await, Some(VoiceEvent::Connected));

        voice.end_session().await.unwrap();
        assert_eq!(voice.status(), ConnectionStatus::Disconnected);
        assert_eq!(rx.recv().await, Some(VoiceEvent::Disconnected));
    }

    #[tokio::test]
    async fn test_end_when_idle_is_silent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let voice = ConsoleVoice::new(tx);
        voice.end_session().await.unwrap();
        drop(voice);
        assert_eq!(rx.recv().await, None);
    }
}
