//! Engine-wide statistics

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

/// Process-wide counters, shared across sessions
///
/// Counters only ever increase; `active_sessions` is sampled from the session
/// map when a snapshot is taken.
#[derive(Debug)]
pub struct EngineStats {
    started_at: Instant,
    sessions_created: AtomicU64,
    participants_served: AtomicU64,
    messages_sent: AtomicU64,
    whiteboard_actions: AtomicU64,
    recordings_stored: AtomicU64,
}

impl EngineStats {
    /// Create a zeroed stats tracker
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            sessions_created: AtomicU64::new(0),
            participants_served: AtomicU64::new(0),
            messages_sent: AtomicU64::new(0),
            whiteboard_actions: AtomicU64::new(0),
            recordings_stored: AtomicU64::new(0),
        }
    }

    /// Record a session creation
    pub fn record_session_created(&self) {
        self.sessions_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a participant joining for the first time
    pub fn record_participant(&self) {
        self.participants_served.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a chat message
    pub fn record_message(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a whiteboard draw/clear/undo
    pub fn record_whiteboard_action(&self) {
        self.whiteboard_actions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed recording handed to the store
    pub fn record_recording_stored(&self) {
        self.recordings_stored.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a snapshot with the given live-session count
    pub fn snapshot(&self, active_sessions: usize) -> StatsSnapshot {
        StatsSnapshot {
            active_sessions,
            sessions_created: self.sessions_created.load(Ordering::Relaxed),
            participants_served: self.participants_served.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            whiteboard_actions: self.whiteboard_actions.load(Ordering::Relaxed),
            recordings_stored: self.recordings_stored.load(Ordering::Relaxed),
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }
}

impl Default for EngineStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time aggregate counters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Sessions currently live
    pub active_sessions: usize,
    /// Sessions ever created
    pub sessions_created: u64,
    /// Distinct participant joins served
    pub participants_served: u64,
    /// Chat messages accepted
    pub messages_sent: u64,
    /// Whiteboard draws, clears, and undos
    pub whiteboard_actions: u64,
    /// Recordings handed to the store
    pub recordings_stored: u64,
    /// Engine uptime in seconds
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = EngineStats::new();

        stats.record_session_created();
        stats.record_participant();
        stats.record_participant();
        stats.record_message();
        stats.record_whiteboard_action();
        stats.record_recording_stored();

        let snapshot = stats.snapshot(1);
        assert_eq!(snapshot.active_sessions, 1);
        assert_eq!(snapshot.sessions_created, 1);
        assert_eq!(snapshot.participants_served, 2);
        assert_eq!(snapshot.messages_sent, 1);
        assert_eq!(snapshot.whiteboard_actions, 1);
        assert_eq!(snapshot.recordings_stored, 1);
    }
}
