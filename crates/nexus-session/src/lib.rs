//! Voice session coordination for Nexus.
//!
//! [`SessionCoordinator`] is the agent-handoff state machine: it tracks the
//! active persona, records the transcript, saves it when a specialist
//! session ends, pre-fetches memory for the next persona and connects it,
//! while a [`ConnectionGuard`] keeps connect attempts one at a time.
//!
//! The voice SDK is reached through the [`VoiceSession`] trait and the
//! backend through [`nexus_backend::MemoryBackend`], so the whole machine can
//! be driven from tests.

/// The session coordinator and its operation outcomes.
pub mod coordinator;
/// The single-flight connection guard.
pub mod guard;
/// Handoff context passed between personas.
pub mod handoff;
/// Dispatch of agent-invoked client tools.
pub mod tools;
/// Traits and types at the voice provider seam.
pub mod voice;

pub use coordinator::{
    auto_connect_transition, CoordinatorSnapshot, IdleReason, Reaction, SaveOutcome,
    SessionCoordinator, SwitchOutcome, ToggleOutcome,
};
pub use guard::{ConnectionGuard, GuardPermit};
pub use handoff::{HandoffPayload, HandoffSlot, SwitchTicket};
pub use tools::{ClientTools, TOOL_NAMES};
pub use voice::{
    AudioPermission, ConnectionStatus, DynamicVariables, GrantedMicrophone, LogNotifier, Notifier,
    StartOptions, VoiceEvent, VoiceSession,
};
