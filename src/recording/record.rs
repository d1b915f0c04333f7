//! Completed recording records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::ParticipantInfo;

use super::capsule::CapturedEvent;

/// Immutable summary of a completed capture
///
/// Handed off to the [`RecordingStore`](super::RecordingStore) on stop and
/// retained independently of the owning session's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingRecord {
    /// Recording id
    pub id: Uuid,
    /// Session the capture belongs to
    pub session_id: String,
    /// Participant that started the capture
    pub started_by: String,
    /// Capture start time
    pub started_at: DateTime<Utc>,
    /// Capture stop time
    pub stopped_at: DateTime<Utc>,
    /// `stopped_at - started_at`, in milliseconds
    pub duration_ms: i64,
    /// Captured whiteboard events, in capture order
    pub events: Vec<CapturedEvent>,
    /// Roster snapshot at stop time
    pub participants: Vec<ParticipantInfo>,
}
