//! Engine configuration

use std::time::Duration;

/// Engine-wide configuration options
///
/// Bounds apply per session; retention windows drive the periodic cleanup
/// sweep (see `SessionRegistry::cleanup`).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum participants per session
    pub max_participants: usize,

    /// Chat messages retained per session
    pub chat_history_limit: usize,

    /// Chat messages included in a join snapshot
    pub snapshot_chat_limit: usize,

    /// Strokes retained on a whiteboard
    pub stroke_limit: usize,

    /// Whiteboard snapshots retained on the undo stack
    pub undo_depth: usize,

    /// Interval between cleanup sweeps
    pub cleanup_interval: Duration,

    /// How long archived session summaries are retained
    pub session_retention: Duration,

    /// How long completed recordings are retained
    pub recording_retention: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_participants: 10,
            chat_history_limit: 1000,
            snapshot_chat_limit: 50,
            stroke_limit: 1000,
            undo_depth: 50,
            cleanup_interval: Duration::from_secs(24 * 60 * 60),
            session_retention: Duration::from_secs(24 * 60 * 60),
            recording_retention: Duration::from_secs(30 * 24 * 60 * 60),
        }
    }
}

impl EngineConfig {
    /// Set maximum participants per session
    pub fn max_participants(mut self, max: usize) -> Self {
        self.max_participants = max;
        self
    }

    /// Set the chat history bound
    pub fn chat_history_limit(mut self, limit: usize) -> Self {
        self.chat_history_limit = limit;
        self
    }

    /// Set how many chat messages a join snapshot carries
    pub fn snapshot_chat_limit(mut self, limit: usize) -> Self {
        self.snapshot_chat_limit = limit;
        self
    }

    /// Set the whiteboard stroke bound
    pub fn stroke_limit(mut self, limit: usize) -> Self {
        self.stroke_limit = limit;
        self
    }

    /// Set the undo stack depth
    pub fn undo_depth(mut self, depth: usize) -> Self {
        self.undo_depth = depth;
        self
    }

    /// Set the cleanup sweep interval
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Set the archived session retention window
    pub fn session_retention(mut self, retention: Duration) -> Self {
        self.session_retention = retention;
        self
    }

    /// Set the recording retention window
    pub fn recording_retention(mut self, retention: Duration) -> Self {
        self.recording_retention = retention;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.max_participants, 10);
        assert_eq!(config.chat_history_limit, 1000);
        assert_eq!(config.snapshot_chat_limit, 50);
        assert_eq!(config.stroke_limit, 1000);
        assert_eq!(config.undo_depth, 50);
        assert_eq!(config.recording_retention, Duration::from_secs(30 * 24 * 60 * 60));
    }

    #[test]
    fn test_builder_chaining() {
        let config = EngineConfig::default()
            .max_participants(4)
            .chat_history_limit(100)
            .snapshot_chat_limit(10)
            .stroke_limit(200)
            .undo_depth(5)
            .cleanup_interval(Duration::from_secs(60))
            .session_retention(Duration::from_secs(3600))
            .recording_retention(Duration::from_secs(7200));

        assert_eq!(config.max_participants, 4);
        assert_eq!(config.chat_history_limit, 100);
        assert_eq!(config.snapshot_chat_limit, 10);
        assert_eq!(config.stroke_limit, 200);
        assert_eq!(config.undo_depth, 5);
        assert_eq!(config.cleanup_interval, Duration::from_secs(60));
        assert_eq!(config.session_retention, Duration::from_secs(3600));
        assert_eq!(config.recording_retention, Duration::from_secs(7200));
    }
}
