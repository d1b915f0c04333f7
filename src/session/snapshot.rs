//! Session views handed to clients
//!
//! Snapshots carry no connection handles. A reconnecting client re-joins and
//! receives a full [`SessionSnapshot`] instead of an event replay.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;
use crate::screenshare::ScreenShare;
use crate::whiteboard::Stroke;

use super::participant::ParticipantInfo;
use super::room::{Session, SessionSettings};

/// Full session state delivered on join
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Session id
    pub session_id: String,
    /// Current host
    pub host_id: Option<String>,
    /// Roster in join order
    pub participants: Vec<ParticipantInfo>,
    /// Current whiteboard strokes
    pub whiteboard: Vec<Stroke>,
    /// Screen-share slot state
    pub screen_share: ScreenShare,
    /// Recent chat history, oldest first
    pub chat: Vec<ChatMessage>,
    /// Session settings
    pub settings: SessionSettings,
}

impl SessionSnapshot {
    /// Capture a snapshot carrying up to `chat_limit` recent messages
    pub fn capture(session: &Session, chat_limit: usize) -> Self {
        Self {
            session_id: session.id.clone(),
            host_id: session.host_id.clone(),
            participants: session.roster(),
            whiteboard: session.whiteboard.strokes(),
            screen_share: session.screen_share.clone(),
            chat: session.chat.recent(chat_limit),
            settings: session.settings.clone(),
        }
    }
}

/// Result of pre-creating a session record out of band
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Reserved session id
    pub session_id: String,
    /// URL clients use to join
    pub join_url: String,
    /// Settings the session will be created with
    pub settings: SessionSettings,
}

/// Summary retained after a session is destroyed
///
/// Purged by the cleanup sweep once older than the session retention window.
#[derive(Debug, Clone)]
pub struct SessionArchive {
    /// Session id
    pub session_id: String,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the roster emptied
    pub ended_at: DateTime<Utc>,
    /// Distinct participants the session served
    pub participants_served: u64,
    /// Chat messages the session accepted
    pub messages: u64,
    /// Destruction instant, for retention arithmetic
    pub ended: Instant,
}

/// Active-vs-archived summary for the query surface
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
#[serde(rename_all_fields = "camelCase")]
pub enum SessionInfo {
    /// Session is live
    Active {
        /// Session id
        session_id: String,
        /// Current host
        host_id: Option<String>,
        /// Roster size
        participant_count: usize,
        /// Creation time
        created_at: DateTime<Utc>,
        /// Whether a screen share is in progress
        screen_share_active: bool,
        /// Whether a recording is in progress
        recording_active: bool,
    },
    /// Session ended; summary retained until the sweep purges it
    Archived {
        /// Session id
        session_id: String,
        /// Creation time
        created_at: DateTime<Utc>,
        /// End time
        ended_at: DateTime<Utc>,
        /// Distinct participants served
        participants_served: u64,
        /// Chat messages accepted
        messages: u64,
    },
}
