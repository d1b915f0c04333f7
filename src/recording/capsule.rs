//! In-progress recording capture

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::session::ParticipantInfo;

use super::record::RecordingRecord;

/// One captured event copy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedEvent {
    /// Event kind (e.g. "whiteboard-draw")
    pub kind: String,
    /// Event payload copy
    pub data: serde_json::Value,
    /// When the event was captured
    pub at: DateTime<Utc>,
}

/// Per-session capture buffer
///
/// Mirrors whiteboard events while active and materializes an immutable
/// [`RecordingRecord`] on stop. Chat is not captured.
#[derive(Debug, Default)]
pub struct RecordingCapsule {
    active: bool,
    started_at: Option<DateTime<Utc>>,
    started_by: Option<String>,
    events: Vec<CapturedEvent>,
}

impl RecordingCapsule {
    /// Create an inactive capsule
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a capture is in progress
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// When the capture started, if active
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Number of events captured so far
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Begin capturing
    ///
    /// Fails without mutating state if a capture is already in progress.
    pub fn start(&mut self, started_by: impl Into<String>) -> Result<DateTime<Utc>, EngineError> {
        if self.active {
            return Err(EngineError::RecordingAlreadyActive);
        }

        let now = Utc::now();
        self.active = true;
        self.started_at = Some(now);
        self.started_by = Some(started_by.into());
        self.events.clear();
        Ok(now)
    }

    /// Append an event copy; no-op while inactive
    pub fn append(&mut self, kind: impl Into<String>, data: serde_json::Value) {
        if !self.active {
            return;
        }

        self.events.push(CapturedEvent {
            kind: kind.into(),
            data,
            at: Utc::now(),
        });
    }

    /// Stop capturing and materialize a record
    ///
    /// Returns `None` (a no-op) if no capture is in progress. Otherwise the
    /// capsule resets to inactive/empty and hands the record to the caller to
    /// persist into the process-wide recording store.
    pub fn stop(
        &mut self,
        session_id: &str,
        participants: Vec<ParticipantInfo>,
    ) -> Option<RecordingRecord> {
        if !self.active {
            return None;
        }

        let stopped_at = Utc::now();
        let started_at = self.started_at.take()?;
        let started_by = self.started_by.take().unwrap_or_default();
        let events = std::mem::take(&mut self.events);
        self.active = false;

        Some(RecordingRecord {
            id: Uuid::new_v4(),
            session_id: session_id.to_string(),
            started_by,
            started_at,
            stopped_at,
            duration_ms: (stopped_at - started_at).num_milliseconds(),
            events,
            participants,
        })
    }
}
