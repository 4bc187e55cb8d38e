//! Client for the Nexus memory backend.
//!
//! Three endpoints are consumed: `POST /api/save-session`,
//! `POST /api/search` and `GET /api/history`. The [`MemoryBackend`] trait is
//! the seam the session coordinator depends on; [`HttpBackend`] implements it
//! with `reqwest`.

/// The backend trait and its HTTP implementation.
pub mod client;
/// Wire types of the backend API.
pub mod dto;

pub use client::{HttpBackend, MemoryBackend};
pub use dto::{
    HistoryItem, HistoryResponse, SaveAck, SearchMatch, SearchRequest, SearchResponse,
    SessionRecord,
};
