//! Request and response bodies of the backend HTTP API.

use nexus_core::{Persona, TranscriptEntry};
use serde::{Deserialize, Serialize};

/// A finished session handed to the backend for summarising and storage.
///
/// Built once from a transcript snapshot and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Persona the session was held with.
    pub session_type: Persona,
    /// Every turn, in order.
    pub dialogue: Vec<TranscriptEntry>,
    /// Owner of the session.
    pub user_id: String,
}

/// Acknowledgement of `/api/save-session`. Every field is optional; the
/// backend reports `status = "no_content"` when the transcript had nothing
/// worth summarising.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SaveAck {
    /// Outcome tag, e.g. `success` or `no_content`.
    #[serde(default)]
    pub status: String,
    /// The generated notes, when the backend returns them.
    #[serde(default)]
    pub markdown: Option<String>,
}

impl SaveAck {
    /// Whether the backend found nothing worth keeping.
    pub fn is_no_content(&self) -> bool {
        self.status == "no_content"
    }
}

/// Body of `/api/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    /// Free-text query.
    pub query: String,
    /// Whose sessions to search.
    pub user_id: String,
    /// Maximum number of matches.
    pub limit: u32,
}

/// One past session returned by `/api/search`, best match first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchMatch {
    /// Notes of the matched session.
    pub markdown: String,
    /// When the session was saved, as the backend formats it.
    #[serde(default)]
    pub created_at: String,
}

/// Response of `/api/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    /// Matches, best first.
    #[serde(default)]
    pub matches: Vec<SearchMatch>,
}

/// A card in the history vault.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryItem {
    /// Backend record id.
    pub id: String,
    /// Session type tag (`scribe`, `debate`, `coach`). Kept as text so
    /// unknown tags from older records still load.
    #[serde(rename = "type", default)]
    pub session_type: String,
    /// Generated title.
    #[serde(default)]
    pub title: Option<String>,
    /// One-line summary.
    #[serde(default)]
    pub short_description: Option<String>,
    /// Save timestamp.
    #[serde(default)]
    pub created_at: String,
    /// Full notes of the session.
    #[serde(default)]
    pub formatted_markdown: String,
}

impl HistoryItem {
    /// The persona this item was recorded under, if the tag is known.
    pub fn persona(&self) -> Option<Persona> {
        serde_json::from_value(serde_json::Value::String(self.session_type.clone())).ok()
    }
}

/// Response of `/api/history`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryResponse {
    /// Saved sessions, newest first.
    #[serde(default)]
    pub history: Vec<HistoryItem>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_record_wire_shape() {
        let record = SessionRecord {
            session_type: Persona::Coach,
            dialogue: vec![TranscriptEntry::user("idea A")],
            user_id: "user_123".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "session_type": "coach",
                "dialogue": [{"role": "user", "content": "idea A"}],
                "user_id": "user_123"
            })
        );
    }

    #[test]
    fn test_history_item_optional_fields() {
        let item: HistoryItem = serde_json::from_value(serde_json::json!({
            "id": "65f0",
            "type": "debate",
            "created_at": "2024-03-12T10:00:00",
            "formatted_markdown": "# Drones"
        }))
        .unwrap();
        assert_eq!(item.title, None);
        assert_eq!(item.persona(), Some(Persona::Debater));

        let odd: HistoryItem =
            serde_json::from_value(serde_json::json!({"id": "1", "type": "legacy"})).unwrap();
        assert_eq!(odd.persona(), None);
    }

    #[test]
    fn test_search_response_without_matches_key() {
        let resp: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.matches.is_empty());
    }
}
