//! Core types and error definitions for Nexus.
//!
//! This crate provides the foundational types shared across all Nexus crates,
//! including error handling, personas, the transcript buffer, tool call
//! abstractions and startup configuration.
//!
//! # Main types
//!
//! - [`NexusError`]: Unified error enum for all Nexus subsystems.
//! - [`NexusResult`]: Convenience alias for `Result<T, NexusError>`.
//! - [`Persona`]: The conversational mode (Scribe, Debater, Coach).
//! - [`Speaker`] / [`TranscriptEntry`]: One recorded dialogue turn.
//! - [`Transcript`]: The append-only buffer of turns pending persistence.
//! - [`ToolCall`] / [`ToolResult`]: Agent-invoked client tool plumbing.
//! - [`NexusConfig`]: Backend URL, user id and persona agent ids.

/// Startup configuration (TOML file + environment overlay).
pub mod config;
/// Error types.
pub mod error;
/// Conversational personas and mode-string resolution.
pub mod persona;
/// Client tool call/result types.
pub mod tool;
/// Transcript entries and the in-memory transcript buffer.
pub mod transcript;

pub use config::{AgentIds, NexusConfig};
pub use error::{NexusError, NexusResult};
pub use persona::Persona;
pub use tool::{ToolCall, ToolResult};
pub use transcript::{Speaker, Transcript, TranscriptEntry};
