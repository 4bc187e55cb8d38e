use serde::{Deserialize, Serialize};
use std::fmt;

/// The conversational mode currently driving the voice session.
///
/// Scribe is the home persona (the "router" agent). Debater and Coach are
/// specialists: leaving them flushes their transcript to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Persona {
    /// Note-taking home persona.
    #[default]
    #[serde(rename = "scribe", alias = "router")]
    Scribe,
    /// Argues the other side of an idea.
    #[serde(rename = "debate")]
    Debater,
    /// Goal-oriented coaching.
    #[serde(rename = "coach")]
    Coach,
}

impl Persona {
    /// All personas, home first.
    pub const ALL: [Persona; 3] = [Persona::Scribe, Persona::Debater, Persona::Coach];

    /// Resolve a free-form mode string, as spoken by an agent, to a persona.
    ///
    /// Anything mentioning "scribe" or "back" goes home. Returns `None` when
    /// no persona can be recognised.
    pub fn resolve(mode: &str) -> Option<Self> {
        let mode = mode.trim().to_lowercase();
        if mode.contains("scribe") || mode.contains("back") || mode.contains("router") {
            Some(Persona::Scribe)
        } else if mode.contains("debat") {
            Some(Persona::Debater)
        } else if mode.contains("coach") {
            Some(Persona::Coach)
        } else {
            None
        }
    }

    /// Tag stored as `session_type` on saved sessions.
    pub fn session_type(&self) -> &'static str {
        match self {
            Persona::Scribe => "scribe",
            Persona::Debater => "debate",
            Persona::Coach => "coach",
        }
    }

    /// Short badge text for display.
    pub fn label(&self) -> &'static str {
        match self {
            Persona::Scribe => "Scribe",
            Persona::Debater => "Debate",
            Persona::Coach => "Coach",
        }
    }

    /// Whether leaving this persona persists its transcript.
    pub fn is_specialist(&self) -> bool {
        matches!(self, Persona::Debater | Persona::Coach)
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.session_type())
    }
}
