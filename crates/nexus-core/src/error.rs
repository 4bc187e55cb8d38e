use thiserror::Error;

/// A convenience `Result` alias using [`NexusError`].
pub type NexusResult<T> = Result<T, NexusError>;

/// Top-level error type for Nexus.
///
/// Each variant corresponds to a subsystem that can produce errors. None of
/// them is fatal to the process: the session coordinator logs and degrades.
#[derive(Error, Debug)]
pub enum NexusError {
    /// Transport-level failure talking to the backend API.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The backend answered, but with a non-success status or an unexpected body.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Connect/disconnect failure reported by the voice session provider.
    #[error("Voice session error: {0}")]
    Voice(String),

    /// The user refused microphone access.
    #[error("Permission denied: {0}")]
    Permission(String),

    /// A client tool was called with an unknown name or bad arguments.
    #[error("Tool error: {0}")]
    Tool(String),

    /// A JSON serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A TOML parse error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_subsystem() {
        let err = NexusError::Backend("500 Internal Server Error".into());
        assert_eq!(err.to_string(), "Backend error: 500 Internal Server Error");

        let err = NexusError::Permission("microphone".into());
        assert_eq!(err.to_string(), "Permission denied: microphone");

        let err = NexusError::Tool("Unknown tool: x".into());
        assert_eq!(err.to_string(), "Tool error: Unknown tool: x");
    }

    #[test]
    fn test_json_error_converts() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: NexusError = parse.unwrap_err().into();
        assert!(matches!(err, NexusError::Serialization(_)));
    }
}
