use serde::{Deserialize, Serialize};

/// Who produced a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    /// The human on the microphone.
    #[serde(rename = "user")]
    User,
    /// The voice agent. Sent as `assistant`, the role name the backend's
    /// summariser expects.
    #[serde(rename = "assistant", alias = "agent")]
    Agent,
}

impl Speaker {
    /// Map a provider message `source` to a speaker: `"ai"` is the agent,
    /// anything else is the user.
    pub fn from_source(source: &str) -> Self {
        if source == "ai" {
            Speaker::Agent
        } else {
            Speaker::User
        }
    }
}

/// One dialogue turn, in the shape the backend stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Speaker of the turn.
    pub role: Speaker,
    /// What was said.
    pub content: String,
}

impl TranscriptEntry {
    /// Creates a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Speaker::User,
            content: content.into(),
        }
    }

    /// Creates an agent turn.
    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: Speaker::Agent,
            content: content.into(),
        }
    }
}

/// Ordered, append-only buffer of the current session's turns.
///
/// Flushing is snapshot-and-clear: [`Transcript::take`] moves every entry out
/// so turns recorded while a save is in flight stay behind for the next
/// session. A failed save hands its snapshot back with [`Transcript::restore`].
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn.
    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    /// Number of buffered turns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there is nothing to save.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The buffered turns, oldest first.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Move all entries out, leaving the buffer empty.
    pub fn take(&mut self) -> Vec<TranscriptEntry> {
        std::mem::take(&mut self.entries)
    }

    /// Put an unsaved snapshot back in front of anything recorded since.
    pub fn restore(&mut self, mut snapshot: Vec<TranscriptEntry>) {
        snapshot.append(&mut self.entries);
        self.entries = snapshot;
    }

    /// Drop every buffered turn.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_source_mapping() {
        assert_eq!(Speaker::from_source("ai"), Speaker::Agent);
        assert_eq!(Speaker::from_source("user"), Speaker::User);
        assert_eq!(Speaker::from_source("anything"), Speaker::User);
    }

    #[test]
    fn test_entry_wire_shape() {
        let json = serde_json::to_value(TranscriptEntry::agent("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "hi"}));

        let back: TranscriptEntry =
            serde_json::from_value(serde_json::json!({"role": "agent", "content": "x"})).unwrap();
        assert_eq!(back.role, Speaker::Agent);
    }

    #[test]
    fn test_take_clears() {
        let mut t = Transcript::new();
        t.push(TranscriptEntry::user("a"));
        t.push(TranscriptEntry::agent("b"));

        let snap = t.take();
        assert_eq!(snap.len(), 2);
        assert!(t.is_empty());
    }

    #[test]
    fn test_restore_keeps_order_ahead_of_new_entries() {
        let mut t = Transcript::new();
        t.push(TranscriptEntry::user("first"));
        let snap = t.take();

        // recorded while the save was in flight
        t.push(TranscriptEntry::user("second"));
        t.restore(snap);

        let contents: Vec<&str> = t.entries().iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }
}
