//! Shared whiteboard state
//!
//! Per-session ordered stroke log plus a bounded undo stack. Conflict
//! resolution is last-writer-appended with a single linear undo stack; there
//! is no causal merge. Undo is coarse-grained: only a `clear` pushes a
//! snapshot, and popping it replaces the whole stroke list. Redo is not
//! supported.
//!
//! All operations are pure and synchronous; the owning session serializes
//! access.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One atomic drawing action
///
/// The `payload` (path, color, width, device coordinates) is opaque to the
/// engine and forwarded verbatim to other clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    /// Stroke id
    pub id: Uuid,
    /// Participant who drew the stroke
    pub participant_id: String,
    /// Opaque path/shape payload
    pub payload: serde_json::Value,
    /// When the stroke was recorded
    pub at: DateTime<Utc>,
}

impl Stroke {
    /// Record a new stroke for a participant
    pub fn new(participant_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            participant_id: participant_id.into(),
            payload,
            at: Utc::now(),
        }
    }
}

/// Whiteboard state for one session
#[derive(Debug)]
pub struct Whiteboard {
    /// Ordered stroke log, oldest first
    strokes: VecDeque<Stroke>,
    /// Whole-list snapshots pushed by `clear`, most recent last
    undo_stack: VecDeque<Vec<Stroke>>,
    /// Maximum strokes retained
    stroke_limit: usize,
    /// Maximum undo snapshots retained
    undo_depth: usize,
}

impl Whiteboard {
    /// Create an empty whiteboard with the given bounds
    pub fn new(stroke_limit: usize, undo_depth: usize) -> Self {
        Self {
            strokes: VecDeque::new(),
            undo_stack: VecDeque::new(),
            stroke_limit,
            undo_depth,
        }
    }

    /// Append a stroke, evicting the oldest beyond the stroke limit
    ///
    /// Does not touch the undo stack.
    pub fn draw(&mut self, stroke: Stroke) {
        self.strokes.push_back(stroke);
        while self.strokes.len() > self.stroke_limit {
            self.strokes.pop_front();
        }
    }

    /// Clear the board, pushing the current strokes onto the undo stack
    pub fn clear(&mut self) {
        let snapshot: Vec<Stroke> = self.strokes.iter().cloned().collect();
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.undo_depth {
            self.undo_stack.pop_front();
        }
        self.strokes.clear();
    }

    /// Pop the most recent snapshot and restore it as the stroke list
    ///
    /// Returns the restored strokes, or `None` if the undo stack is empty
    /// (a no-op, and the caller emits no event).
    pub fn undo(&mut self) -> Option<Vec<Stroke>> {
        let snapshot = self.undo_stack.pop_back()?;
        self.strokes = snapshot.iter().cloned().collect();
        Some(snapshot)
    }

    /// Current strokes, oldest first
    pub fn strokes(&self) -> Vec<Stroke> {
        self.strokes.iter().cloned().collect()
    }

    /// Number of strokes on the board
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// Number of snapshots on the undo stack
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
}
