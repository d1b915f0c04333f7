//! Wire event types
//!
//! Inbound client events and outbound notifications, serde-tagged with the
//! semantic names clients see. The transport deserializes frames into
//! [`ClientEvent`] and serializes [`ServerEvent`] back out; the engine never
//! touches the framing itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::{ChatMessage, MessageKind};
use crate::session::{ParticipantInfo, Role, SessionSnapshot};
use crate::whiteboard::Stroke;

/// Inbound connection events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Join (and lazily create) a session
    JoinSession {
        session_id: String,
        participant_id: String,
        display_name: String,
        #[serde(default)]
        role: Option<Role>,
    },
    /// Leave the session explicitly
    LeaveSession {
        session_id: String,
        participant_id: String,
    },
    /// Send a chat message
    SendMessage {
        session_id: String,
        participant_id: String,
        message: String,
        #[serde(rename = "type", default)]
        kind: Option<MessageKind>,
    },
    /// Draw a stroke
    WhiteboardDraw {
        session_id: String,
        participant_id: String,
        stroke: serde_json::Value,
    },
    /// Clear the whiteboard
    WhiteboardClear {
        session_id: String,
        participant_id: String,
    },
    /// Undo the most recent clear
    WhiteboardUndo {
        session_id: String,
        participant_id: String,
    },
    /// Claim the screen-share slot
    StartScreenShare {
        session_id: String,
        participant_id: String,
        stream_id: String,
    },
    /// Release the screen-share slot
    StopScreenShare {
        session_id: String,
        participant_id: String,
    },
    /// Start recording (host only)
    StartRecording {
        session_id: String,
        participant_id: String,
    },
    /// Stop recording (host only)
    StopRecording {
        session_id: String,
        participant_id: String,
    },
}

/// Outbound notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Full state snapshot, delivered to the joiner only
    SessionJoined { snapshot: SessionSnapshot },
    /// Join rejected at capacity, delivered to the requester only
    SessionFull { session_id: String },
    /// A participant joined
    ParticipantJoined { participant: ParticipantInfo },
    /// A participant left
    ParticipantLeft { participant: ParticipantInfo },
    /// Host role migrated
    HostChanged { new_host: ParticipantInfo },
    /// Chat message accepted
    NewMessage { message: ChatMessage },
    /// Stroke drawn (sent to everyone but the drawer)
    WhiteboardDraw { stroke: Stroke },
    /// Whiteboard cleared (sent to everyone but the actor)
    WhiteboardClear { actor_id: String },
    /// Clear undone; `strokes` is the restored list
    WhiteboardUndo { actor_id: String, strokes: Vec<Stroke> },
    /// Screen share started
    ScreenShareStarted { presenter: String, stream_id: String },
    /// Screen share stopped
    ScreenShareStopped { presenter: String },
    /// Screen-share failure, delivered to the requester only
    ScreenShareError { message: String },
    /// Recording started
    RecordingStarted {
        started_by: String,
        started_at: DateTime<Utc>,
    },
    /// Recording stopped and stored
    RecordingStopped {
        stopped_by: String,
        recording_id: Uuid,
        duration_ms: i64,
    },
    /// Recording failure, delivered to the requester only
    RecordingError { message: String },
}

/// Who an outbound notification goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// The requesting connection only
    Sender,
    /// Every bound connection in the room except the sender
    Others,
    /// Every bound connection in the room, sender included
    Room,
}

/// One notification with its delivery audience
#[derive(Debug, Clone)]
pub struct Outbound {
    /// Delivery audience
    pub audience: Audience,
    /// The notification
    pub event: ServerEvent,
}

impl Outbound {
    /// Deliver to the requester only
    pub fn sender(event: ServerEvent) -> Self {
        Self {
            audience: Audience::Sender,
            event,
        }
    }

    /// Deliver to the room except the requester
    pub fn others(event: ServerEvent) -> Self {
        Self {
            audience: Audience::Others,
            event,
        }
    }

    /// Deliver to the whole room
    pub fn room(event: ServerEvent) -> Self {
        Self {
            audience: Audience::Room,
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_wire_format() {
        let json = serde_json::json!({
            "event": "join-session",
            "data": {
                "sessionId": "s1",
                "participantId": "alice",
                "displayName": "Alice"
            }
        });

        let event: ClientEvent = serde_json::from_value(json).unwrap();
        match event {
            ClientEvent::JoinSession {
                session_id,
                participant_id,
                display_name,
                role,
            } => {
                assert_eq!(session_id, "s1");
                assert_eq!(participant_id, "alice");
                assert_eq!(display_name, "Alice");
                assert!(role.is_none());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_send_message_type_field() {
        let json = serde_json::json!({
            "event": "send-message",
            "data": {
                "sessionId": "s1",
                "participantId": "alice",
                "message": "hi",
                "type": "text"
            }
        });

        let event: ClientEvent = serde_json::from_value(json).unwrap();
        match event {
            ClientEvent::SendMessage { kind, .. } => assert_eq!(kind, Some(MessageKind::Text)),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_server_event_tag_names() {
        let event = ServerEvent::WhiteboardClear {
            actor_id: "alice".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "whiteboard-clear");
        assert_eq!(json["data"]["actorId"], "alice");

        let event = ServerEvent::ScreenShareStopped {
            presenter: "bob".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "screen-share-stopped");
    }
}
