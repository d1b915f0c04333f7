//! Engine error types
//!
//! Every error is scoped to one session or one requester; nothing here is
//! fatal to the process.

/// Error type for engine operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Session is at its participant capacity
    SessionFull(String),
    /// Host-only operation attempted by a non-host
    NotHost(String),
    /// Screen share is already active in this session
    ShareAlreadyActive,
    /// Recording is already active in this session
    RecordingAlreadyActive,
    /// Recording is not active in this session
    RecordingNotActive,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::SessionFull(id) => write!(f, "Session full: {}", id),
            EngineError::NotHost(participant) => {
                write!(f, "Host-only operation attempted by {}", participant)
            }
            EngineError::ShareAlreadyActive => write!(f, "Screen share already active"),
            EngineError::RecordingAlreadyActive => write!(f, "Recording already active"),
            EngineError::RecordingNotActive => write!(f, "Recording not active"),
        }
    }
}

impl std::error::Error for EngineError {}
