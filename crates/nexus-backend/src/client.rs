use crate::dto::{
    HistoryItem, HistoryResponse, SaveAck, SearchMatch, SearchRequest, SearchResponse,
    SessionRecord,
};
use async_trait::async_trait;
use nexus_core::{NexusError, NexusResult};
use serde::de::DeserializeOwned;
use tracing::debug;

/// The persistence and search API the session coordinator talks to.
///
/// `HttpBackend` is the production implementation; tests substitute an
/// in-memory one.
#[async_trait]
pub trait MemoryBackend: Send + Sync {
    /// Persist a finished session.
    async fn save_session(&self, record: &SessionRecord) -> NexusResult<SaveAck>;

    /// Relevance-ranked search over past sessions.
    async fn search(&self, request: &SearchRequest) -> NexusResult<Vec<SearchMatch>>;

    /// All saved sessions of `user_id`, as history cards.
    async fn history(&self, user_id: &str) -> NexusResult<Vec<HistoryItem>>;
}

/// JSON-over-HTTP backend client.
///
/// Timeouts are whatever the underlying `reqwest::Client` enforces.
pub struct HttpBackend {
    base_url: String,
    http: reqwest::Client,
}

impl HttpBackend {
    /// Creates a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Use a pre-configured client (proxy, timeouts, TLS roots).
    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    /// Base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Read the body and fail on non-success statuses, keeping the body text
/// in the error for the logs.
async fn read_body(resp: reqwest::Response, endpoint: &str) -> NexusResult<String> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| NexusError::Http(e.to_string()))?;

    if !status.is_success() {
        return Err(NexusError::Backend(format!(
            "{endpoint} returned {status}: {body}"
        )));
    }
    Ok(body)
}

fn parse<T: DeserializeOwned>(body: &str) -> NexusResult<T> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl MemoryBackend for HttpBackend {
    async fn save_session(&self, record: &SessionRecord) -> NexusResult<SaveAck> {
        let url = self.url("/api/save-session");
        debug!(
            session_type = %record.session_type,
            turns = record.dialogue.len(),
            "POST save-session"
        );

        let resp = self
            .http
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| NexusError::Http(e.to_string()))?;
        let body = read_body(resp, "save-session").await?;

        // The ack shape is loosely defined; an unparseable 2xx body still
        // means the session was stored.
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn search(&self, request: &SearchRequest) -> NexusResult<Vec<SearchMatch>> {
        let url = self.url("/api/search");
        debug!(query = %request.query, limit = request.limit, "POST search");

        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| NexusError::Http(e.to_string()))?;
        let body = read_body(resp, "search").await?;
        let parsed: SearchResponse = parse(&body)?;
        Ok(parsed.matches)
    }

    async fn history(&self, user_id: &str) -> NexusResult<Vec<HistoryItem>> {
        let url = self.url("/api/history");
        debug!(user_id, "GET history");

        let resp = self
            .http
            .get(&url)
            .query(&[("user_id", user_id)])
            .send()
            .await
            .map_err(|e| NexusError::Http(e.to_string()))?;
        let body = read_body(resp, "history").await?;
        let parsed: HistoryResponse = parse(&body)?;
        Ok(parsed.history)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = HttpBackend::new("http://localhost:8000/");
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(
            backend.url("/api/search"),
            "http://localhost:8000/api/search"
        );
    }

    #[test]
    fn test_parse_reports_serialization_error() {
        let err = parse::<SearchResponse>("<html>").unwrap_err();
        assert!(matches!(err, NexusError::Serialization(_)));
    }
}
