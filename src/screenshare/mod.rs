//! Screen-share arbitration
//!
//! Single-writer lock for the presenter slot: at most one active presenter
//! per session at any time. The owning session serializes access.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Screen-share slot state for one session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenShare {
    /// Whether a share is in progress
    pub active: bool,
    /// Current presenter (None when inactive)
    pub presenter_id: Option<String>,
    /// Transport-level stream identifier supplied by the presenter
    pub stream_id: Option<String>,
}

impl ScreenShare {
    /// Create an inactive slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the presenter slot
    ///
    /// Fails without mutating state if a share is already active.
    pub fn start(
        &mut self,
        participant_id: impl Into<String>,
        stream_id: impl Into<String>,
    ) -> Result<(), EngineError> {
        if self.active {
            return Err(EngineError::ShareAlreadyActive);
        }

        self.active = true;
        self.presenter_id = Some(participant_id.into());
        self.stream_id = Some(stream_id.into());
        Ok(())
    }

    /// Release the slot if `participant_id` is the current presenter
    ///
    /// Returns whether the slot was released. A non-presenter caller is a
    /// silent no-op.
    pub fn stop(&mut self, participant_id: &str) -> bool {
        if self.presenter_id.as_deref() != Some(participant_id) {
            tracing::debug!(
                participant = %participant_id,
                presenter = ?self.presenter_id,
                "Screen share stop ignored: not the presenter"
            );
            return false;
        }

        self.active = false;
        self.presenter_id = None;
        self.stream_id = None;
        true
    }

    /// Release the slot unconditionally
    ///
    /// Used when the presenter leaves or disconnects. Returns the presenter
    /// that was cleared, or `None` if the slot was already inactive.
    pub fn force_stop(&mut self) -> Option<String> {
        if !self.active {
            return None;
        }

        let presenter = self.presenter_id.take();
        self.active = false;
        self.stream_id = None;
        presenter
    }

    /// Whether `participant_id` currently holds the slot
    pub fn is_presenter(&self, participant_id: &str) -> bool {
        self.active && self.presenter_id.as_deref() == Some(participant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_claims_slot() {
        let mut share = ScreenShare::new();

        share.start("alice", "stream-1").unwrap();
        assert!(share.active);
        assert!(share.is_presenter("alice"));
        assert_eq!(share.stream_id.as_deref(), Some("stream-1"));
    }

    #[test]
    fn test_second_start_rejected_without_mutation() {
        let mut share = ScreenShare::new();
        share.start("alice", "stream-1").unwrap();

        let err = share.start("bob", "stream-2").unwrap_err();
        assert_eq!(err, EngineError::ShareAlreadyActive);
        assert!(share.is_presenter("alice"));
        assert_eq!(share.stream_id.as_deref(), Some("stream-1"));
    }

    #[test]
    fn test_stop_by_non_presenter_is_noop() {
        let mut share = ScreenShare::new();
        share.start("alice", "stream-1").unwrap();

        assert!(!share.stop("bob"));
        assert!(share.active);

        assert!(share.stop("alice"));
        assert!(!share.active);
        assert!(share.presenter_id.is_none());
        assert!(share.stream_id.is_none());
    }

    #[test]
    fn test_force_stop() {
        let mut share = ScreenShare::new();
        assert!(share.force_stop().is_none());

        share.start("alice", "stream-1").unwrap();
        assert_eq!(share.force_stop().as_deref(), Some("alice"));
        assert!(!share.active);
        assert!(share.force_stop().is_none());
    }
}
