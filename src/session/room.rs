//! Per-session room state
//!
//! A [`Session`] owns its roster, whiteboard, screen-share slot, in-progress
//! recording, and chat log. All access is serialized by the per-session mutex
//! held in the [`SessionRegistry`](super::SessionRegistry) map.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::ChatLog;
use crate::config::EngineConfig;
use crate::connection::ConnectionId;
use crate::recording::RecordingCapsule;
use crate::screenshare::ScreenShare;
use crate::whiteboard::Whiteboard;

use super::participant::{Participant, ParticipantInfo, Role};

/// Per-session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    /// Maximum participants admitted
    pub max_participants: usize,
    /// Whether participants may draw on the whiteboard
    pub drawing_allowed: bool,
    /// Whether chat is enabled
    pub chat_allowed: bool,
    /// Whether screen sharing is enabled
    pub screen_share_allowed: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_participants: 10,
            drawing_allowed: true,
            chat_allowed: true,
            screen_share_allowed: true,
        }
    }
}

impl SessionSettings {
    /// Default settings with the engine-configured participant cap
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            max_participants: config.max_participants,
            ..Self::default()
        }
    }
}

/// All in-memory state for one live session
#[derive(Debug)]
pub struct Session {
    /// Session id
    pub id: String,
    /// Current host participant id
    pub host_id: Option<String>,
    /// Roster, keyed by participant id
    participants: HashMap<String, Participant>,
    /// Participant ids in insertion order (drives display order and
    /// deterministic host migration)
    join_order: Vec<String>,
    /// Shared whiteboard
    pub whiteboard: Whiteboard,
    /// Screen-share slot
    pub screen_share: ScreenShare,
    /// In-progress recording capture
    pub recording: RecordingCapsule,
    /// Chat history
    pub chat: ChatLog,
    /// Session settings
    pub settings: SessionSettings,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// Distinct participants ever admitted
    pub participants_served: u64,
    /// Chat messages ever accepted
    pub messages_total: u64,
}

impl Session {
    /// Create an empty session with the given settings
    pub fn new(id: impl Into<String>, settings: SessionSettings, config: &EngineConfig) -> Self {
        Self {
            id: id.into(),
            host_id: None,
            participants: HashMap::new(),
            join_order: Vec::new(),
            whiteboard: Whiteboard::new(config.stroke_limit, config.undo_depth),
            screen_share: ScreenShare::new(),
            recording: RecordingCapsule::new(),
            chat: ChatLog::new(config.chat_history_limit),
            settings,
            created_at: Utc::now(),
            participants_served: 0,
            messages_total: 0,
        }
    }

    /// Number of participants in the roster
    pub fn roster_size(&self) -> usize {
        self.participants.len()
    }

    /// Whether the roster is empty
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Whether `participant_id` is in the roster
    pub fn contains(&self, participant_id: &str) -> bool {
        self.participants.contains_key(participant_id)
    }

    /// Whether `participant_id` is the current host
    pub fn is_host(&self, participant_id: &str) -> bool {
        self.host_id.as_deref() == Some(participant_id)
    }

    /// Look up a participant
    pub fn participant(&self, participant_id: &str) -> Option<&Participant> {
        self.participants.get(participant_id)
    }

    /// Admit or re-admit a participant
    ///
    /// A rejoin with a known id overwrites in place and keeps the original
    /// insertion-order slot. The first participant admitted becomes host.
    /// Returns the admitted participant's info, and whether this id was new
    /// to the session.
    pub fn admit(
        &mut self,
        participant_id: &str,
        display_name: &str,
        connection: Option<ConnectionId>,
    ) -> (ParticipantInfo, bool) {
        let is_new = !self.participants.contains_key(participant_id);

        let role = if self.host_id.is_none() || self.is_host(participant_id) {
            Role::Host
        } else {
            Role::Participant
        };

        if self.host_id.is_none() {
            self.host_id = Some(participant_id.to_string());
        }

        let participant = Participant::new(participant_id, display_name, role, connection);
        let info = participant.info();
        self.participants.insert(participant_id.to_string(), participant);
        if is_new {
            self.join_order.push(participant_id.to_string());
            self.participants_served += 1;
        }

        (info, is_new)
    }

    /// Remove a participant from the roster
    pub fn remove(&mut self, participant_id: &str) -> Option<Participant> {
        let removed = self.participants.remove(participant_id)?;
        self.join_order.retain(|id| id != participant_id);
        Some(removed)
    }

    /// Transfer the host role to the first remaining participant
    ///
    /// Deterministic by insertion order. Returns the new host's info, or
    /// `None` if the roster is empty. The departed host must already be
    /// removed from the roster.
    pub fn migrate_host(&mut self) -> Option<ParticipantInfo> {
        let next_id = self.join_order.first()?.clone();
        self.host_id = Some(next_id.clone());

        let next = self.participants.get_mut(&next_id)?;
        next.role = Role::Host;
        Some(next.info())
    }

    /// Roster in insertion order, without connection handles
    pub fn roster(&self) -> Vec<ParticipantInfo> {
        self.join_order
            .iter()
            .filter_map(|id| self.participants.get(id))
            .map(Participant::info)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new("s1", SessionSettings::default(), &EngineConfig::default())
    }

    #[test]
    fn test_first_admit_becomes_host() {
        let mut s = session();

        let (info, is_new) = s.admit("alice", "Alice", None);
        assert!(is_new);
        assert_eq!(info.role, Role::Host);
        assert!(s.is_host("alice"));

        let (info, _) = s.admit("bob", "Bob", None);
        assert_eq!(info.role, Role::Participant);
        assert!(s.is_host("alice"));
    }

    #[test]
    fn test_rejoin_keeps_insertion_slot_and_host() {
        let mut s = session();
        s.admit("alice", "Alice", None);
        s.admit("bob", "Bob", None);

        let (info, is_new) = s.admit("alice", "Alice A.", None);
        assert!(!is_new);
        assert_eq!(info.role, Role::Host);
        assert_eq!(s.roster_size(), 2);
        assert_eq!(s.participants_served, 2);

        let roster = s.roster();
        assert_eq!(roster[0].id, "alice");
        assert_eq!(roster[0].display_name, "Alice A.");
        assert_eq!(roster[1].id, "bob");
    }

    #[test]
    fn test_live_flag_tracks_bound_connection() {
        let mut s = session();

        let (info, _) = s.admit("alice", "Alice", Some(7));
        assert!(info.live);

        // Headless admit, e.g. seeded before the transport attaches
        let (info, _) = s.admit("bob", "Bob", None);
        assert!(!info.live);

        // Rejoin with a connection flips the flag
        let (info, _) = s.admit("bob", "Bob", Some(8));
        assert!(info.live);
    }

    #[test]
    fn test_host_migration_is_insertion_ordered() {
        let mut s = session();
        s.admit("alice", "Alice", None);
        s.admit("bob", "Bob", None);
        s.admit("carol", "Carol", None);

        s.remove("alice");
        let new_host = s.migrate_host().unwrap();
        assert_eq!(new_host.id, "bob");
        assert_eq!(new_host.role, Role::Host);
        assert!(s.is_host("bob"));
    }

    #[test]
    fn test_migrate_host_on_empty_roster() {
        let mut s = session();
        s.admit("alice", "Alice", None);
        s.remove("alice");

        assert!(s.migrate_host().is_none());
        assert!(s.is_empty());
    }
}
