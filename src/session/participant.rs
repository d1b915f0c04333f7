//! Participants and roles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::connection::ConnectionId;

/// Participant role within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Elevated privileges (start/stop recording); migrates when vacated
    Host,
    /// Ordinary participant
    Participant,
}

/// One participant, owned exclusively by its session
#[derive(Debug, Clone)]
pub struct Participant {
    /// Participant id (caller-supplied, validated upstream)
    pub id: String,
    /// Display name
    pub display_name: String,
    /// Current role
    pub role: Role,
    /// Connection currently bound to this participant
    ///
    /// A rejoin rebinds to the new connection; leave paths compare against
    /// this so a stale connection's late disconnect cannot evict the
    /// participant.
    pub connection: Option<ConnectionId>,
    /// When the participant joined
    pub joined_at: DateTime<Utc>,
    /// Whether the participant has a bound connection
    pub live: bool,
}

impl Participant {
    /// Create a participant joined now
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
        connection: Option<ConnectionId>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role,
            connection,
            joined_at: Utc::now(),
            live: connection.is_some(),
        }
    }

    /// Public view of the participant (no connection handle)
    pub fn info(&self) -> ParticipantInfo {
        ParticipantInfo {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            live: self.live,
        }
    }
}

/// Roster entry as exposed to clients and recordings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    /// Participant id
    pub id: String,
    /// Display name
    pub display_name: String,
    /// Current role
    pub role: Role,
    /// Whether the participant has a bound connection
    pub live: bool,
}
