use crate::guard::ConnectionGuard;
use crate::handoff::{HandoffPayload, HandoffSlot};
use crate::voice::{
    AudioPermission, ConnectionStatus, DynamicVariables, GrantedMicrophone, LogNotifier, Notifier,
    StartOptions, VoiceEvent, VoiceSession,
};
use nexus_backend::{HistoryItem, MemoryBackend, SearchMatch, SearchRequest, SessionRecord};
use nexus_core::{NexusConfig, NexusResult, Persona, Speaker, Transcript, TranscriptEntry};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Handoff context when the topic has no saved notes.
pub const NO_PRIOR_NOTES: &str = "No prior notes found. Start fresh.";
/// Agent-facing answer when a search finds nothing.
pub const NO_RELEVANT_NOTES: &str = "No relevant past notes found on that topic.";
/// Agent-facing answer when the search endpoint fails.
pub const MEMORY_UNAVAILABLE: &str = "I failed to access memory.";
/// Alert raised when the microphone is refused.
pub const MICROPHONE_REQUIRED: &str = "Microphone access required.";
/// Answer of the `open_history` tool.
pub const HISTORY_OPENED: &str = "Opening your history vault.";
/// Topic sent on connect when no handoff is pending.
pub const DEFAULT_TOPIC: &str = "General";

/// Status line while idle.
pub const STATUS_IDLE: &str = "Tap to Initialize";
/// Status line during an auto-connect.
pub const STATUS_CONNECTING: &str = "Connecting to specialist...";
/// Status line while a session is live.
pub const STATUS_LIVE: &str = "Speaking and Listening...";
/// Status line while ending a session.
pub const STATUS_SAVING: &str = "Saving & Resetting...";
/// Status line during an agent search.
pub const STATUS_SEARCHING: &str = "Searching Memory...";
/// Status line once an agent search has answered.
pub const STATUS_LISTENING: &str = "Listening...";

// ---------------------------------------------------------------------------
// Auto-connect transition table
// ---------------------------------------------------------------------------

/// Why the auto-connect reaction did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleReason {
    /// A connect attempt is already in flight.
    Guarded,
    /// Scribe is only ever connected by hand.
    HomePersona,
    /// The provider is not disconnected.
    Busy(ConnectionStatus),
    /// The persona has no agent id.
    Unconfigured,
}

/// Result of evaluating the auto-connect reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// A connect to this persona was issued.
    Connect(Persona),
    /// Nothing was done.
    Idle(IdleReason),
}

/// `disconnected × specialist persona → connect`; every other combination
/// stays idle.
pub fn auto_connect_transition(
    persona: Persona,
    status: ConnectionStatus,
    guarded: bool,
    configured: bool,
) -> Reaction {
    if guarded {
        return Reaction::Idle(IdleReason::Guarded);
    }
    if persona == Persona::Scribe {
        return Reaction::Idle(IdleReason::HomePersona);
    }
    if status != ConnectionStatus::Disconnected {
        return Reaction::Idle(IdleReason::Busy(status));
    }
    if !configured {
        return Reaction::Idle(IdleReason::Unconfigured);
    }
    Reaction::Connect(persona)
}

// ---------------------------------------------------------------------------
// Operation outcomes
// ---------------------------------------------------------------------------

/// Result of [`SessionCoordinator::save_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Empty transcript, nothing sent.
    Skipped,
    /// Sent and acknowledged.
    Saved {
        /// Number of turns persisted.
        turns: usize,
    },
    /// The backend call failed and the transcript was put back.
    Failed,
}

/// Result of [`SessionCoordinator::switch_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The persona is now `persona`. `reaction` is `None` when it was
    /// already active, so no reaction fired.
    Switched {
        /// The persona now active.
        persona: Persona,
        /// Auto-connect result, if it ran.
        reaction: Option<Reaction>,
    },
    /// The mode string matched no configured persona. Nothing changed.
    Unresolved,
    /// A later switch or end of session overtook this one before it applied.
    Superseded,
}

/// Result of [`SessionCoordinator::toggle_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The live session was ended.
    Disconnected,
    /// The provider accepted a connect request.
    ConnectRequested,
    /// The microphone was refused; the user was alerted.
    PermissionDenied,
    /// The provider is mid-transition or a connect is already in flight.
    Busy,
    /// No agent id, or the provider rejected the connect.
    Failed,
}

/// Read-only view of the coordinator, for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinatorSnapshot {
    /// Active persona.
    pub persona: Persona,
    /// Provider connection status.
    pub status: ConnectionStatus,
    /// Whether the agent is speaking.
    pub speaking: bool,
    /// Human-readable status line.
    pub status_message: String,
    /// Number of unsaved turns.
    pub transcript_len: usize,
    /// Handoff waiting for the next connect.
    pub pending_handoff: Option<HandoffPayload>,
    /// Whether the history view is requested.
    pub history_requested: bool,
    /// Whether a connect attempt is in flight.
    pub guarded: bool,
}

// ---------------------------------------------------------------------------
// SessionCoordinator
// ---------------------------------------------------------------------------

struct CoordinatorState {
    active: Persona,
    transcript: Transcript,
    handoff: HandoffSlot,
    status_message: String,
    history_requested: bool,
}

/// Owns the active persona, the transcript buffer, the pending handoff and
/// the connection guard, and mediates between the voice session and the
/// memory backend.
///
/// All methods take `&self`; share it behind an `Arc` between the UI, the
/// provider's event stream and tool callbacks. The state lock is never held
/// across an `.await`.
pub struct SessionCoordinator {
    config: NexusConfig,
    voice: Arc<dyn VoiceSession>,
    backend: Arc<dyn MemoryBackend>,
    permission: Arc<dyn AudioPermission>,
    notifier: Arc<dyn Notifier>,
    guard: ConnectionGuard,
    state: Mutex<CoordinatorState>,
}

impl SessionCoordinator {
    /// A coordinator on Scribe, idle, with the microphone assumed granted
    /// and alerts going to the log.
    pub fn new(
        config: NexusConfig,
        voice: Arc<dyn VoiceSession>,
        backend: Arc<dyn MemoryBackend>,
    ) -> Self {
        Self {
            config,
            voice,
            backend,
            permission: Arc::new(GrantedMicrophone),
            notifier: Arc::new(LogNotifier),
            guard: ConnectionGuard::new(),
            state: Mutex::new(CoordinatorState {
                active: Persona::Scribe,
                transcript: Transcript::new(),
                handoff: HandoffSlot::new(),
                status_message: STATUS_IDLE.to_string(),
                history_requested: false,
            }),
        }
    }

    /// Replace the microphone permission check.
    pub fn with_permission(mut self, permission: Arc<dyn AudioPermission>) -> Self {
        self.permission = permission;
        self
    }

    /// Replace where user-facing alerts go.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Configuration this coordinator was built with.
    pub fn config(&self) -> &NexusConfig {
        &self.config
    }

    /// Persona the next connect targets.
    pub fn active_persona(&self) -> Persona {
        self.state.lock().active
    }

    /// Connection status as the provider reports it.
    pub fn connection_status(&self) -> ConnectionStatus {
        self.voice.status()
    }

    /// Speaking flag; always `false` unless connected.
    pub fn is_speaking(&self) -> bool {
        self.voice.status() == ConnectionStatus::Connected && self.voice.is_speaking()
    }

    /// Human-readable status line.
    pub fn status_message(&self) -> String {
        self.state.lock().status_message.clone()
    }

    /// Copy of the unsaved turns.
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.state.lock().transcript.entries().to_vec()
    }

    /// Handoff waiting for the next connect.
    pub fn pending_handoff(&self) -> Option<HandoffPayload> {
        self.state.lock().handoff.peek().cloned()
    }

    /// Whether the history view should be shown.
    pub fn history_requested(&self) -> bool {
        self.state.lock().history_requested
    }

    /// Whether a connect attempt is in flight.
    pub fn is_guarded(&self) -> bool {
        self.guard.is_latched()
    }

    /// Everything a renderer needs, read at once.
    pub fn snapshot(&self) -> CoordinatorSnapshot {
        let status = self.voice.status();
        let speaking = status == ConnectionStatus::Connected && self.voice.is_speaking();
        let guarded = self.guard.is_latched();
        let state = self.state.lock();
        CoordinatorSnapshot {
            persona: state.active,
            status,
            speaking,
            status_message: state.status_message.clone(),
            transcript_len: state.transcript.len(),
            pending_handoff: state.handoff.peek().cloned(),
            history_requested: state.history_requested,
            guarded,
        }
    }

    fn set_status(&self, message: impl Into<String>) {
        self.state.lock().status_message = message.into();
    }

    /// Go back to idle, unless someone else has replaced `ours` meanwhile.
    fn reset_status_from(&self, ours: Option<&str>) {
        let Some(ours) = ours else { return };
        let mut state = self.state.lock();
        if state.status_message == ours {
            state.status_message = STATUS_IDLE.to_string();
        }
    }

    // --- Provider events ---

    /// Apply one event from the voice provider.
    pub fn handle_event(&self, event: VoiceEvent) {
        match event {
            VoiceEvent::Connected => {
                let mut state = self.state.lock();
                let dropped = state.transcript.len();
                state.transcript.clear();
                state.status_message = STATUS_LIVE.to_string();
                info!(persona = %state.active, dropped, "Voice session connected");
            }
            VoiceEvent::Disconnected => {
                self.set_status(STATUS_IDLE);
                info!("Voice session disconnected");
            }
            VoiceEvent::Message { source, message } => {
                let entry = TranscriptEntry {
                    role: Speaker::from_source(&source),
                    content: message,
                };
                debug!(role = ?entry.role, content = %entry.content, "Logged turn");
                self.state.lock().transcript.push(entry);
            }
            VoiceEvent::Error(message) => {
                warn!(error = %message, "Voice provider error");
            }
        }
    }

    // --- Persona changes and the auto-connect reaction ---

    /// Make `persona` active. If it changed, the auto-connect reaction fires
    /// and its result is returned.
    pub async fn select_persona(&self, persona: Persona) -> Option<Reaction> {
        let previous = {
            let mut state = self.state.lock();
            std::mem::replace(&mut state.active, persona)
        };
        if previous == persona {
            return None;
        }
        info!(from = %previous, to = %persona, "Active persona changed");
        Some(self.auto_connect_reaction().await)
    }

    /// Connect to the active persona if the transition table allows it,
    /// consuming the pending handoff as dynamic variables.
    pub async fn auto_connect_reaction(&self) -> Reaction {
        let persona = self.active_persona();
        let agent_id = self.config.agent_id(persona).map(str::to_owned);
        let decision = auto_connect_transition(
            persona,
            self.voice.status(),
            self.guard.is_latched(),
            agent_id.is_some(),
        );

        let agent_id = match agent_id {
            Some(id) if matches!(decision, Reaction::Connect(_)) => id,
            _ => {
                debug!(persona = %persona, ?decision, "Auto-connect idle");
                return decision;
            }
        };

        let Some(_permit) = self.guard.try_acquire() else {
            return Reaction::Idle(IdleReason::Guarded);
        };

        let variables = match self.state.lock().handoff.take() {
            Some(handoff) => DynamicVariables {
                topic: handoff.topic,
                user_context: handoff.context,
            },
            None => DynamicVariables {
                topic: DEFAULT_TOPIC.to_string(),
                user_context: String::new(),
            },
        };

        self.set_status(STATUS_CONNECTING);
        info!(persona = %persona, topic = %variables.topic, "Connecting with handoff");

        let options = StartOptions {
            agent_id,
            dynamic_variables: Some(variables),
        };
        if let Err(e) = self.voice.start_session(options).await {
            error!(persona = %persona, error = %e, "Failed to switch agent");
            self.set_status(STATUS_IDLE);
        }
        decision
    }

    // --- Operations ---

    /// Persist the transcript under `tag`.
    ///
    /// The buffer is snapshotted and cleared before the request; turns
    /// recorded meanwhile stay for the next session. On failure the snapshot
    /// is put back in front of them.
    pub async fn save_session(&self, tag: Persona) -> SaveOutcome {
        let dialogue = {
            let mut state = self.state.lock();
            if state.transcript.is_empty() {
                return SaveOutcome::Skipped;
            }
            state.transcript.take()
        };

        let turns = dialogue.len();
        let record = SessionRecord {
            session_type: tag,
            dialogue,
            user_id: self.config.user_id.clone(),
        };
        info!(session_type = %tag, turns, "Saving session");

        match self.backend.save_session(&record).await {
            Ok(ack) => {
                if ack.is_no_content() {
                    info!(session_type = %tag, "Backend found no content in session");
                }
                SaveOutcome::Saved { turns }
            }
            Err(e) => {
                error!(session_type = %tag, error = %e, "Save failed, transcript kept");
                self.state.lock().transcript.restore(record.dialogue);
                SaveOutcome::Failed
            }
        }
    }

    /// Hand the conversation to another persona.
    ///
    /// Ends the live session, flushes a specialist's transcript, pre-fetches
    /// notes on `topic` into the handoff slot, then activates the target.
    /// Unresolvable modes abort before anything is touched.
    pub async fn switch_mode(&self, mode: &str, topic: Option<&str>) -> SwitchOutcome {
        let Some(target) = Persona::resolve(mode) else {
            debug!(mode, "Unresolvable mode, ignoring switch");
            return SwitchOutcome::Unresolved;
        };
        if self.config.agent_id(target).is_none() {
            warn!(mode, persona = %target, "No agent id for persona, ignoring switch");
            return SwitchOutcome::Unresolved;
        }

        let ticket = self.state.lock().handoff.issue();

        self.disconnect().await;

        let outgoing = self.active_persona();
        if outgoing.is_specialist() {
            self.save_session(outgoing).await;
        }

        let mut searching = None;
        if let Some(topic) = topic.map(str::trim).filter(|t| !t.is_empty()) {
            info!(topic, "Pre-fetching memory for handoff");
            let status = format!("Searching memory for {topic}...");
            self.set_status(status.clone());
            searching = Some(status);
            let context = self.handoff_context(topic).await;
            let payload = HandoffPayload {
                topic: topic.to_string(),
                context,
            };
            if !self.state.lock().handoff.fill(ticket, payload) {
                debug!(topic, "Discarding stale handoff search result");
            }
        }

        if !self.state.lock().handoff.is_current(ticket) {
            info!(persona = %target, "Mode switch superseded");
            self.reset_status_from(searching.as_deref());
            return SwitchOutcome::Superseded;
        }

        let reaction = self.select_persona(target).await;
        if !matches!(reaction, Some(Reaction::Connect(_))) {
            self.reset_status_from(searching.as_deref());
        }
        SwitchOutcome::Switched {
            persona: target,
            reaction,
        }
    }

    /// Finish the conversation: save it under the current persona, go back to
    /// Scribe, then disconnect.
    pub async fn end_session(&self) -> SaveOutcome {
        let tag = {
            let mut state = self.state.lock();
            // overtakes any switch still waiting on its search
            state.handoff.issue();
            state.active
        };
        info!(persona = %tag, "Ending session");
        self.set_status(STATUS_SAVING);

        let saved = self.save_session(tag).await;

        // Scribe before disconnecting, or the reaction would redial the specialist.
        self.select_persona(Persona::Scribe).await;
        self.disconnect().await;

        self.set_status(STATUS_IDLE);
        saved
    }

    /// Manual connect/disconnect. Disconnecting here does not save the
    /// transcript; use [`SessionCoordinator::end_session`] for that.
    pub async fn toggle_session(&self) -> ToggleOutcome {
        match self.voice.status() {
            ConnectionStatus::Connected => {
                self.disconnect().await;
                ToggleOutcome::Disconnected
            }
            ConnectionStatus::Disconnected => {
                if let Err(e) = self.permission.request_microphone().await {
                    warn!(error = %e, "Microphone permission refused");
                    self.notifier.alert(MICROPHONE_REQUIRED);
                    return ToggleOutcome::PermissionDenied;
                }

                let persona = self.active_persona();
                let Some(agent_id) = self.config.agent_id(persona).map(str::to_owned) else {
                    warn!(persona = %persona, "No agent id configured, cannot connect");
                    return ToggleOutcome::Failed;
                };
                let Some(_permit) = self.guard.try_acquire() else {
                    return ToggleOutcome::Busy;
                };

                info!(persona = %persona, "Manual connect");
                let options = StartOptions {
                    agent_id,
                    dynamic_variables: None,
                };
                match self.voice.start_session(options).await {
                    Ok(()) => ToggleOutcome::ConnectRequested,
                    Err(e) => {
                        error!(persona = %persona, error = %e, "Manual connect failed");
                        ToggleOutcome::Failed
                    }
                }
            }
            status => {
                debug!(%status, "Toggle ignored during transition");
                ToggleOutcome::Busy
            }
        }
    }

    /// Agent-facing memory lookup: one sentence describing the best match.
    pub async fn search_memory(&self, query: &str) -> String {
        info!(query, "Agent is searching memory");
        self.set_status(STATUS_SEARCHING);

        let answer = match self.search_top(query).await {
            Ok(Some(top)) => format!(
                "Found a relevant past session from {}. Here is the summary: {}",
                top.created_at, top.markdown
            ),
            Ok(None) => NO_RELEVANT_NOTES.to_string(),
            Err(e) => {
                error!(query, error = %e, "Memory search failed");
                MEMORY_UNAVAILABLE.to_string()
            }
        };

        self.set_status(STATUS_LISTENING);
        answer
    }

    /// Saved sessions for the history view; empty when the backend fails.
    pub async fn load_history(&self) -> Vec<HistoryItem> {
        match self.backend.history(&self.config.user_id).await {
            Ok(items) => {
                debug!(count = items.len(), "History loaded");
                items
            }
            Err(e) => {
                warn!(error = %e, "Failed to load history");
                Vec::new()
            }
        }
    }

    /// Raise the history flag and return the agent's answer.
    pub fn open_history(&self) -> &'static str {
        self.state.lock().history_requested = true;
        HISTORY_OPENED
    }

    /// Lower the history flag.
    pub fn close_history(&self) {
        self.state.lock().history_requested = false;
    }

    /// Release the connection guard when the owner goes away.
    pub fn teardown(&self) {
        self.guard.force_release();
        debug!("Coordinator torn down");
    }

    // --- Helpers ---

    async fn disconnect(&self) {
        if let Err(e) = self.voice.end_session().await {
            warn!(error = %e, "Disconnect failed");
        }
    }

    async fn search_top(&self, query: &str) -> NexusResult<Option<SearchMatch>> {
        let request = SearchRequest {
            query: query.to_string(),
            user_id: self.config.user_id.clone(),
            limit: 1,
        };
        let matches = self.backend.search(&request).await?;
        Ok(matches.into_iter().next())
    }

    async fn handoff_context(&self, topic: &str) -> String {
        match self.search_top(topic).await {
            Ok(Some(top)) => {
                debug!(topic, "Memory found for handoff");
                top.markdown
            }
            Ok(None) => NO_PRIOR_NOTES.to_string(),
            Err(e) => {
                error!(topic, error = %e, "Search failed during switch");
                String::new()
            }
        }
    }
}
