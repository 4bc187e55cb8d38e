use serde::{Deserialize, Serialize};

/// Context carried from one persona to the next across a mode switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffPayload {
    /// Subject the next persona should pick up.
    pub topic: String,
    /// Prior notes on the topic, or a fixed sentence when there are none.
    pub context: String,
}

/// Identifies one mode switch. Only the most recently issued ticket may
/// write the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SwitchTicket(u64);

/// Single-slot handoff buffer. A newer payload overwrites an unconsumed one;
/// payloads from superseded switches are dropped.
#[derive(Debug, Default)]
pub struct HandoffSlot {
    pending: Option<HandoffPayload>,
    latest: u64,
}

impl HandoffSlot {
    /// Creates an empty slot with no tickets issued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new switch, superseding every earlier ticket.
    pub fn issue(&mut self) -> SwitchTicket {
        self.latest += 1;
        SwitchTicket(self.latest)
    }

    /// Whether `ticket` is the most recently issued one.
    pub fn is_current(&self, ticket: SwitchTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Store `payload` if `ticket` is still current. Returns whether it was kept.
    pub fn fill(&mut self, ticket: SwitchTicket, payload: HandoffPayload) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.pending = Some(payload);
        true
    }

    /// Consume the pending payload.
    pub fn take(&mut self) -> Option<HandoffPayload> {
        self.pending.take()
    }

    /// Look at the pending payload without consuming it.
    pub fn peek(&self) -> Option<&HandoffPayload> {
        self.pending.as_ref()
    }
}
