//! Session registry
//!
//! The central control-flow hub: owns session lifecycle, orchestrates the
//! whiteboard, screen-share slot, and recording capsule, and returns the
//! outbound notifications each operation produces for the dispatcher to fan
//! out.
//!
//! Concurrency model: a `RwLock<HashMap>` of sessions, each behind its own
//! `tokio::sync::Mutex`. Every mutating operation on one session runs inside
//! that mutex, so per-session invariants (single presenter, bounded stacks,
//! exactly-once host migration) hold without cross-session contention.
//! Operations on different sessions run fully in parallel. State commits
//! before delivery; nothing inside the critical section blocks on a client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::chat::{ChatMessage, MessageKind};
use crate::config::EngineConfig;
use crate::connection::ConnectionId;
use crate::dispatch::{Outbound, ServerEvent};
use crate::error::EngineError;
use crate::recording::{RecordingRecord, RecordingStore};
use crate::stats::{EngineStats, StatsSnapshot};
use crate::whiteboard::Stroke;

use super::participant::Role;
use super::room::{Session, SessionSettings};
use super::snapshot::{SessionArchive, SessionInfo, SessionRecord, SessionSnapshot};

/// Registry of live sessions and the operations on them
pub struct SessionRegistry {
    /// Live sessions, each serialized by its own mutex
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,

    /// Summaries of destroyed sessions, purged by the cleanup sweep
    archives: RwLock<HashMap<String, SessionArchive>>,

    /// Settings reserved out of band for sessions not yet joined
    reserved: RwLock<HashMap<String, (SessionSettings, Instant)>>,

    /// Process-wide store for completed recordings
    recordings: Arc<RecordingStore>,

    /// Process-wide counters
    stats: Arc<EngineStats>,

    /// Configuration
    config: EngineConfig,
}

impl SessionRegistry {
    /// Create a registry with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a registry with custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            archives: RwLock::new(HashMap::new()),
            reserved: RwLock::new(HashMap::new()),
            recordings: Arc::new(RecordingStore::new()),
            stats: Arc::new(EngineStats::new()),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the recording store
    pub fn recording_store(&self) -> &Arc<RecordingStore> {
        &self.recordings
    }

    /// Join a session, creating it on first join
    ///
    /// Rejects with [`EngineError::SessionFull`] once the roster is at
    /// capacity; a rejoin with a known participant id is always admitted and
    /// overwrites in place. Returns the joiner's snapshot (self-only) and a
    /// `participant-joined` notification for the rest of the room.
    pub async fn join(
        &self,
        session_id: &str,
        participant_id: &str,
        display_name: &str,
        requested_role: Option<Role>,
        connection: Option<ConnectionId>,
    ) -> Result<Vec<Outbound>, EngineError> {
        // Hold the map lock across admission so a racing leave cannot destroy
        // the session between lookup and admit.
        let mut sessions = self.sessions.write().await;

        let session_arc = if let Some(existing) = sessions.get(session_id) {
            Arc::clone(existing)
        } else {
            let settings = self
                .take_reserved(session_id)
                .await
                .unwrap_or_else(|| SessionSettings::from_config(&self.config));
            let session = Session::new(session_id, settings, &self.config);
            let arc = Arc::new(Mutex::new(session));
            sessions.insert(session_id.to_string(), Arc::clone(&arc));
            self.stats.record_session_created();

            tracing::info!(session = %session_id, "Session created");
            arc
        };

        let mut session = session_arc.lock().await;

        if !session.contains(participant_id)
            && session.roster_size() >= session.settings.max_participants
        {
            tracing::info!(
                session = %session_id,
                participant = %participant_id,
                max = session.settings.max_participants,
                "Join rejected: session full"
            );
            return Err(EngineError::SessionFull(session_id.to_string()));
        }

        let (info, is_new) = session.admit(participant_id, display_name, connection);
        if is_new {
            self.stats.record_participant();
        }
        if requested_role == Some(Role::Host) && info.role != Role::Host {
            tracing::debug!(
                session = %session_id,
                participant = %participant_id,
                "Requested host role ignored: session already has a host"
            );
        }

        tracing::info!(
            session = %session_id,
            participant = %participant_id,
            roster = session.roster_size(),
            rejoin = !is_new,
            "Participant joined"
        );

        let snapshot = SessionSnapshot::capture(&session, self.config.snapshot_chat_limit);
        Ok(vec![
            Outbound::sender(ServerEvent::SessionJoined { snapshot }),
            Outbound::others(ServerEvent::ParticipantJoined { participant: info }),
        ])
    }

    /// Remove a participant from a session
    ///
    /// Force-stops the screen share if the leaver was presenting, migrates
    /// the host role if the leaver was host, and destroys the session when
    /// the roster empties. Unknown session or participant is a no-op.
    ///
    /// When `connection` is given, the removal only proceeds if the
    /// participant is still bound to that connection. A participant who
    /// rejoined on a newer connection keeps their seat when the old
    /// connection's disconnect finally lands.
    pub async fn leave(
        &self,
        session_id: &str,
        participant_id: &str,
        connection: Option<ConnectionId>,
    ) -> Vec<Outbound> {
        let mut sessions = self.sessions.write().await;
        let Some(session_arc) = sessions.get(session_id).cloned() else {
            return Vec::new();
        };
        let mut session = session_arc.lock().await;

        if let Some(acting) = connection {
            let current = session
                .participant(participant_id)
                .and_then(|p| p.connection);
            if let Some(current) = current {
                if current != acting {
                    tracing::debug!(
                        session = %session_id,
                        participant = %participant_id,
                        connection = acting,
                        "Leave ignored: participant rebound to a newer connection"
                    );
                    return Vec::new();
                }
            }
        }

        let Some(removed) = session.remove(participant_id) else {
            return Vec::new();
        };
        let was_host = session.host_id.as_deref() == Some(participant_id);

        let mut out = vec![Outbound::room(ServerEvent::ParticipantLeft {
            participant: removed.info(),
        })];

        // Leave must never strand the presenter or host fields on a removed
        // participant.
        if session.screen_share.is_presenter(participant_id) {
            if let Some(presenter) = session.screen_share.force_stop() {
                tracing::info!(
                    session = %session_id,
                    presenter = %presenter,
                    "Screen share force-stopped: presenter left"
                );
                out.push(Outbound::room(ServerEvent::ScreenShareStopped { presenter }));
            }
        }

        if session.is_empty() {
            if session.recording.is_active() {
                tracing::warn!(
                    session = %session_id,
                    captured_events = session.recording.event_count(),
                    "Session destroyed with recording in progress; capture discarded"
                );
            }

            let archive = SessionArchive {
                session_id: session.id.clone(),
                created_at: session.created_at,
                ended_at: Utc::now(),
                participants_served: session.participants_served,
                messages: session.messages_total,
                ended: Instant::now(),
            };
            drop(session);
            sessions.remove(session_id);
            self.archives
                .write()
                .await
                .insert(session_id.to_string(), archive);

            tracing::info!(session = %session_id, "Session destroyed: roster empty");
        } else if was_host {
            if let Some(new_host) = session.migrate_host() {
                tracing::info!(
                    session = %session_id,
                    new_host = %new_host.id,
                    "Host migrated"
                );
                out.push(Outbound::room(ServerEvent::HostChanged { new_host }));
            }
        }

        tracing::info!(
            session = %session_id,
            participant = %participant_id,
            "Participant left"
        );
        out
    }

    /// Append a chat message
    ///
    /// Silently ignored if the participant is unknown to the session or chat
    /// is disabled. The sender's display name is denormalized into the
    /// message. Chat is not mirrored into an active recording.
    pub async fn send_chat(
        &self,
        session_id: &str,
        participant_id: &str,
        body: &str,
        kind: Option<MessageKind>,
    ) -> Vec<Outbound> {
        let Some(session_arc) = self.session(session_id).await else {
            return Vec::new();
        };
        let mut session = session_arc.lock().await;

        let Some(sender) = session.participant(participant_id) else {
            tracing::debug!(
                session = %session_id,
                participant = %participant_id,
                "Chat ignored: unknown participant"
            );
            return Vec::new();
        };
        if !session.settings.chat_allowed {
            tracing::debug!(session = %session_id, "Chat ignored: disabled by settings");
            return Vec::new();
        }

        let message = ChatMessage::new(
            participant_id,
            sender.display_name.clone(),
            body,
            kind.unwrap_or_default(),
        );
        session.chat.push(message.clone());
        session.messages_total += 1;
        self.stats.record_message();

        vec![Outbound::room(ServerEvent::NewMessage { message })]
    }

    /// Draw a stroke on the whiteboard
    ///
    /// Mirrored into the recording capsule while a capture is active. The
    /// drawer already has the local result, so the broadcast excludes them.
    pub async fn draw(
        &self,
        session_id: &str,
        participant_id: &str,
        payload: serde_json::Value,
    ) -> Vec<Outbound> {
        let Some(session_arc) = self.session(session_id).await else {
            return Vec::new();
        };
        let mut session = session_arc.lock().await;

        if !self.can_draw(&session, session_id, participant_id) {
            return Vec::new();
        }

        let stroke = Stroke::new(participant_id, payload);
        if session.recording.is_active() {
            let data = serde_json::to_value(&stroke).unwrap_or_default();
            session.recording.append("whiteboard-draw", data);
        }
        session.whiteboard.draw(stroke.clone());
        self.stats.record_whiteboard_action();

        vec![Outbound::others(ServerEvent::WhiteboardDraw { stroke })]
    }

    /// Clear the whiteboard, pushing an undo snapshot
    pub async fn clear(&self, session_id: &str, participant_id: &str) -> Vec<Outbound> {
        let Some(session_arc) = self.session(session_id).await else {
            return Vec::new();
        };
        let mut session = session_arc.lock().await;

        if !self.can_draw(&session, session_id, participant_id) {
            return Vec::new();
        }

        session.whiteboard.clear();
        if session.recording.is_active() {
            session
                .recording
                .append("whiteboard-clear", serde_json::json!({ "actorId": participant_id }));
        }
        self.stats.record_whiteboard_action();

        vec![Outbound::others(ServerEvent::WhiteboardClear {
            actor_id: participant_id.to_string(),
        })]
    }

    /// Undo the most recent clear
    ///
    /// A no-op with no event when the undo stack is empty.
    pub async fn undo(&self, session_id: &str, participant_id: &str) -> Vec<Outbound> {
        let Some(session_arc) = self.session(session_id).await else {
            return Vec::new();
        };
        let mut session = session_arc.lock().await;

        if !self.can_draw(&session, session_id, participant_id) {
            return Vec::new();
        }

        let Some(strokes) = session.whiteboard.undo() else {
            return Vec::new();
        };
        if session.recording.is_active() {
            let data = serde_json::json!({
                "actorId": participant_id,
                "strokes": strokes,
            });
            session.recording.append("whiteboard-undo", data);
        }
        self.stats.record_whiteboard_action();

        vec![Outbound::others(ServerEvent::WhiteboardUndo {
            actor_id: participant_id.to_string(),
            strokes,
        })]
    }

    /// Claim the session's screen-share slot
    pub async fn start_screen_share(
        &self,
        session_id: &str,
        participant_id: &str,
        stream_id: &str,
    ) -> Result<Vec<Outbound>, EngineError> {
        let Some(session_arc) = self.session(session_id).await else {
            return Ok(Vec::new());
        };
        let mut session = session_arc.lock().await;

        if !session.contains(participant_id) {
            tracing::debug!(
                session = %session_id,
                participant = %participant_id,
                "Screen share ignored: unknown participant"
            );
            return Ok(Vec::new());
        }
        if !session.settings.screen_share_allowed {
            tracing::debug!(session = %session_id, "Screen share ignored: disabled by settings");
            return Ok(Vec::new());
        }

        session.screen_share.start(participant_id, stream_id)?;
        tracing::info!(
            session = %session_id,
            presenter = %participant_id,
            stream = %stream_id,
            "Screen share started"
        );

        Ok(vec![Outbound::room(ServerEvent::ScreenShareStarted {
            presenter: participant_id.to_string(),
            stream_id: stream_id.to_string(),
        })])
    }

    /// Release the screen-share slot
    ///
    /// A silent no-op unless the caller is the current presenter.
    pub async fn stop_screen_share(&self, session_id: &str, participant_id: &str) -> Vec<Outbound> {
        let Some(session_arc) = self.session(session_id).await else {
            return Vec::new();
        };
        let mut session = session_arc.lock().await;

        if !session.screen_share.stop(participant_id) {
            return Vec::new();
        }

        tracing::info!(
            session = %session_id,
            presenter = %participant_id,
            "Screen share stopped"
        );
        vec![Outbound::room(ServerEvent::ScreenShareStopped {
            presenter: participant_id.to_string(),
        })]
    }

    /// Start recording (host only)
    pub async fn start_recording(
        &self,
        session_id: &str,
        participant_id: &str,
    ) -> Result<Vec<Outbound>, EngineError> {
        let Some(session_arc) = self.session(session_id).await else {
            return Ok(Vec::new());
        };
        let mut session = session_arc.lock().await;

        if !session.is_host(participant_id) {
            return Err(EngineError::NotHost(participant_id.to_string()));
        }

        let started_at = session.recording.start(participant_id)?;
        tracing::info!(
            session = %session_id,
            started_by = %participant_id,
            "Recording started"
        );

        Ok(vec![Outbound::room(ServerEvent::RecordingStarted {
            started_by: participant_id.to_string(),
            started_at,
        })])
    }

    /// Stop recording and persist the record (host only)
    pub async fn stop_recording(
        &self,
        session_id: &str,
        participant_id: &str,
    ) -> Result<Vec<Outbound>, EngineError> {
        let Some(session_arc) = self.session(session_id).await else {
            return Ok(Vec::new());
        };
        let mut session = session_arc.lock().await;

        if !session.is_host(participant_id) {
            return Err(EngineError::NotHost(participant_id.to_string()));
        }

        let roster = session.roster();
        let Some(record) = session.recording.stop(session_id, roster) else {
            return Err(EngineError::RecordingNotActive);
        };

        let record = self.recordings.insert(record).await;
        self.stats.record_recording_stored();

        Ok(vec![Outbound::room(ServerEvent::RecordingStopped {
            stopped_by: participant_id.to_string(),
            recording_id: record.id,
            duration_ms: record.duration_ms,
        })])
    }

    /// Reserve a session id and settings out of band
    ///
    /// The first join of the returned id creates the session with these
    /// settings instead of the defaults.
    pub async fn create_session_record(
        &self,
        host_id: &str,
        settings: Option<SessionSettings>,
    ) -> SessionRecord {
        let session_id = Uuid::new_v4().to_string();
        let settings = settings.unwrap_or_else(|| SessionSettings::from_config(&self.config));

        self.reserved
            .write()
            .await
            .insert(session_id.clone(), (settings.clone(), Instant::now()));

        tracing::info!(session = %session_id, host = %host_id, "Session record created");
        SessionRecord {
            join_url: format!("/session/{}", session_id),
            session_id,
            settings,
        }
    }

    /// Active-vs-archived summary for a session id
    pub async fn session_info(&self, session_id: &str) -> Option<SessionInfo> {
        if let Some(session_arc) = self.session(session_id).await {
            let session = session_arc.lock().await;
            return Some(SessionInfo::Active {
                session_id: session.id.clone(),
                host_id: session.host_id.clone(),
                participant_count: session.roster_size(),
                created_at: session.created_at,
                screen_share_active: session.screen_share.active,
                recording_active: session.recording.is_active(),
            });
        }

        let archives = self.archives.read().await;
        archives.get(session_id).map(|archive| SessionInfo::Archived {
            session_id: archive.session_id.clone(),
            created_at: archive.created_at,
            ended_at: archive.ended_at,
            participants_served: archive.participants_served,
            messages: archive.messages,
        })
    }

    /// Look up a completed recording
    pub async fn recording(&self, id: Uuid) -> Option<Arc<RecordingRecord>> {
        self.recordings.get(id).await
    }

    /// Aggregate engine counters
    pub async fn stats(&self) -> StatsSnapshot {
        let active = self.sessions.read().await.len();
        self.stats.snapshot(active)
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Run the retention sweep once
    ///
    /// Purges archived session summaries and stale out-of-band reservations
    /// older than the session retention window, and completed recordings
    /// older than the recording retention window. Runs outside any session's
    /// mutex and tolerates concurrent deletion.
    pub async fn cleanup(&self) {
        let now = Instant::now();

        {
            let mut archives = self.archives.write().await;
            let before = archives.len();
            archives.retain(|_, archive| {
                now.duration_since(archive.ended) <= self.config.session_retention
            });
            let purged = before - archives.len();
            if purged > 0 {
                tracing::info!(purged, "Archived sessions removed by cleanup");
            }
        }

        {
            let mut reserved = self.reserved.write().await;
            reserved.retain(|_, (_, reserved_at)| {
                now.duration_since(*reserved_at) <= self.config.session_retention
            });
        }

        self.recordings.cleanup(self.config.recording_retention).await;
    }

    /// Spawn the periodic cleanup task
    ///
    /// Returns a handle that can be used to abort the task on shutdown.
    pub fn spawn_cleanup_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);
        let interval = registry.config.cleanup_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                registry.cleanup().await;
            }
        })
    }

    async fn session(&self, session_id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    async fn take_reserved(&self, session_id: &str) -> Option<SessionSettings> {
        self.reserved
            .write()
            .await
            .remove(session_id)
            .map(|(settings, _)| settings)
    }

    fn can_draw(&self, session: &Session, session_id: &str, participant_id: &str) -> bool {
        if !session.contains(participant_id) {
            tracing::debug!(
                session = %session_id,
                participant = %participant_id,
                "Whiteboard action ignored: unknown participant"
            );
            return false;
        }
        if !session.settings.drawing_allowed {
            tracing::debug!(session = %session_id, "Whiteboard action ignored: disabled by settings");
            return false;
        }
        true
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Audience;

    fn events(out: &[Outbound]) -> Vec<&ServerEvent> {
        out.iter().map(|o| &o.event).collect()
    }

    #[tokio::test]
    async fn test_join_creates_session_with_snapshot() {
        let registry = SessionRegistry::new();

        let out = registry
            .join("s1", "alice", "Alice", None, None)
            .await
            .unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].audience, Audience::Sender);
        match &out[0].event {
            ServerEvent::SessionJoined { snapshot } => {
                assert_eq!(snapshot.session_id, "s1");
                assert_eq!(snapshot.host_id.as_deref(), Some("alice"));
                assert_eq!(snapshot.participants.len(), 1);
                assert!(snapshot.whiteboard.is_empty());
                assert!(snapshot.chat.is_empty());
                assert!(!snapshot.screen_share.active);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(out[1].audience, Audience::Others);
        assert_eq!(registry.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_capacity_rejects_without_mutation() {
        let registry = SessionRegistry::with_config(EngineConfig::default().max_participants(2));
        registry.join("s1", "a", "A", None, None).await.unwrap();
        registry.join("s1", "b", "B", None, None).await.unwrap();

        let err = registry.join("s1", "c", "C", None, None).await.unwrap_err();
        assert_eq!(err, EngineError::SessionFull("s1".to_string()));

        // Roster unchanged; a rejoin of a known id is still admitted
        let out = registry.join("s1", "b", "B", None, None).await.unwrap();
        match &out[0].event {
            ServerEvent::SessionJoined { snapshot } => {
                assert_eq!(snapshot.participants.len(), 2);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_host_migration_on_host_leave() {
        let registry = SessionRegistry::new();
        registry.join("s1", "a", "A", None, None).await.unwrap();
        registry.join("s1", "b", "B", None, None).await.unwrap();
        registry.join("s1", "c", "C", None, None).await.unwrap();

        let out = registry.leave("s1", "a", None).await;
        let evs = events(&out);
        assert!(matches!(evs[0], ServerEvent::ParticipantLeft { .. }));
        match evs[1] {
            ServerEvent::HostChanged { new_host } => {
                assert_eq!(new_host.id, "b");
                assert_eq!(new_host.role, Role::Host);
            }
            other => panic!("unexpected event: {:?}", other),
        }

        // The old host rejoins as an ordinary participant
        let out = registry.join("s1", "a", "A", None, None).await.unwrap();
        match &out[1].event {
            ServerEvent::ParticipantJoined { participant } => {
                assert_eq!(participant.role, Role::Participant);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_leave_from_stale_connection_keeps_rejoined_participant() {
        let registry = SessionRegistry::new();
        registry.join("s1", "a", "A", None, Some(1)).await.unwrap();
        // Rejoin on a newer connection, e.g. after a page reload
        registry.join("s1", "a", "A", None, Some(2)).await.unwrap();

        // The old connection's leave must not evict the rebound participant
        let out = registry.leave("s1", "a", Some(1)).await;
        assert!(out.is_empty());
        assert_eq!(registry.session_count().await, 1);

        // The live connection's leave still works
        let out = registry.leave("s1", "a", Some(2)).await;
        assert!(matches!(
            events(&out)[0],
            ServerEvent::ParticipantLeft { .. }
        ));
        assert_eq!(registry.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_presenter_leave_force_stops_share_once() {
        let registry = SessionRegistry::new();
        registry.join("s1", "a", "A", None, None).await.unwrap();
        registry.join("s1", "b", "B", None, None).await.unwrap();
        registry
            .start_screen_share("s1", "b", "stream-1")
            .await
            .unwrap();

        let out = registry.leave("s1", "b", None).await;
        let stops = out
            .iter()
            .filter(|o| matches!(o.event, ServerEvent::ScreenShareStopped { .. }))
            .count();
        assert_eq!(stops, 1);

        // Slot is free again
        let out = registry
            .start_screen_share("s1", "a", "stream-2")
            .await
            .unwrap();
        assert!(matches!(
            out[0].event,
            ServerEvent::ScreenShareStarted { .. }
        ));
    }

    #[tokio::test]
    async fn test_second_share_rejected_without_mutation() {
        let registry = SessionRegistry::new();
        registry.join("s1", "a", "A", None, None).await.unwrap();
        registry.join("s1", "b", "B", None, None).await.unwrap();
        registry
            .start_screen_share("s1", "a", "stream-1")
            .await
            .unwrap();

        let err = registry
            .start_screen_share("s1", "b", "stream-2")
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::ShareAlreadyActive);

        let info = registry.session_info("s1").await.unwrap();
        match info {
            SessionInfo::Active {
                screen_share_active, ..
            } => assert!(screen_share_active),
            other => panic!("unexpected info: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stop_share_by_non_presenter_is_silent() {
        let registry = SessionRegistry::new();
        registry.join("s1", "a", "A", None, None).await.unwrap();
        registry.join("s1", "b", "B", None, None).await.unwrap();
        registry
            .start_screen_share("s1", "a", "stream-1")
            .await
            .unwrap();

        assert!(registry.stop_screen_share("s1", "b").await.is_empty());
        assert_eq!(registry.stop_screen_share("s1", "a").await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_leave_destroys_session() {
        let registry = SessionRegistry::new();
        registry.join("s1", "a", "A", None, None).await.unwrap();
        registry
            .draw("s1", "a", serde_json::json!({ "x": 1 }))
            .await;

        registry.leave("s1", "a", None).await;
        assert_eq!(registry.session_count().await, 0);
        assert!(matches!(
            registry.session_info("s1").await,
            Some(SessionInfo::Archived { .. })
        ));

        // A later join with the same id gets a brand-new empty session
        let out = registry.join("s1", "b", "B", None, None).await.unwrap();
        match &out[0].event {
            ServerEvent::SessionJoined { snapshot } => {
                assert!(snapshot.whiteboard.is_empty());
                assert_eq!(snapshot.host_id.as_deref(), Some("b"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_destruction_discards_in_progress_recording() {
        let registry = SessionRegistry::new();
        registry.join("s1", "a", "A", None, None).await.unwrap();
        registry.start_recording("s1", "a").await.unwrap();
        registry
            .draw("s1", "a", serde_json::json!({ "x": 1 }))
            .await;

        registry.leave("s1", "a", None).await;
        assert!(registry.recording_store().is_empty().await);
    }

    #[tokio::test]
    async fn test_chat_unknown_participant_is_silent() {
        let registry = SessionRegistry::new();
        registry.join("s1", "a", "A", None, None).await.unwrap();

        assert!(registry
            .send_chat("s1", "ghost", "hello", None)
            .await
            .is_empty());

        let out = registry.send_chat("s1", "a", "hello", None).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].audience, Audience::Room);
        match &out[0].event {
            ServerEvent::NewMessage { message } => {
                assert_eq!(message.sender_name, "A");
                assert_eq!(message.body, "hello");
                assert_eq!(message.kind, MessageKind::Text);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recording_host_only_and_capture_contents() {
        let registry = SessionRegistry::new();
        registry.join("s1", "a", "A", None, None).await.unwrap();
        registry.join("s1", "b", "B", None, None).await.unwrap();

        let err = registry.start_recording("s1", "b").await.unwrap_err();
        assert_eq!(err, EngineError::NotHost("b".to_string()));

        let err = registry.stop_recording("s1", "a").await.unwrap_err();
        assert_eq!(err, EngineError::RecordingNotActive);

        // Draw before start is not captured
        registry
            .draw("s1", "a", serde_json::json!({ "seq": 0 }))
            .await;

        registry.start_recording("s1", "a").await.unwrap();
        let err = registry.start_recording("s1", "a").await.unwrap_err();
        assert_eq!(err, EngineError::RecordingAlreadyActive);

        registry
            .draw("s1", "b", serde_json::json!({ "seq": 1 }))
            .await;
        registry.clear("s1", "a").await;
        registry.undo("s1", "a").await;
        registry.send_chat("s1", "a", "not captured", None).await;

        let out = registry.stop_recording("s1", "a").await.unwrap();
        let recording_id = match &out[0].event {
            ServerEvent::RecordingStopped { recording_id, .. } => *recording_id,
            other => panic!("unexpected event: {:?}", other),
        };

        let record = registry.recording(recording_id).await.unwrap();
        let kinds: Vec<&str> = record.events.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["whiteboard-draw", "whiteboard-clear", "whiteboard-undo"]
        );
        assert_eq!(record.participants.len(), 2);
        assert_eq!(
            record.duration_ms,
            (record.stopped_at - record.started_at).num_milliseconds()
        );
    }

    #[tokio::test]
    async fn test_undo_with_empty_stack_emits_nothing() {
        let registry = SessionRegistry::new();
        registry.join("s1", "a", "A", None, None).await.unwrap();

        assert!(registry.undo("s1", "a").await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_undo_restores_board() {
        let registry = SessionRegistry::new();
        registry.join("s1", "a", "A", None, None).await.unwrap();
        registry
            .draw("s1", "a", serde_json::json!({ "seq": 0 }))
            .await;
        registry
            .draw("s1", "a", serde_json::json!({ "seq": 1 }))
            .await;

        registry.clear("s1", "a").await;
        let out = registry.undo("s1", "a").await;
        match &out[0].event {
            ServerEvent::WhiteboardUndo { strokes, .. } => {
                assert_eq!(strokes.len(), 2);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_session_record_reserves_settings() {
        let registry = SessionRegistry::new();
        let record = registry
            .create_session_record(
                "host-1",
                Some(SessionSettings {
                    max_participants: 1,
                    ..SessionSettings::default()
                }),
            )
            .await;
        assert_eq!(record.join_url, format!("/session/{}", record.session_id));

        registry
            .join(&record.session_id, "a", "A", None, None)
            .await
            .unwrap();
        let err = registry
            .join(&record.session_id, "b", "B", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::SessionFull(_)));
    }

    #[tokio::test]
    async fn test_cleanup_purges_archives() {
        let registry = SessionRegistry::with_config(
            EngineConfig::default().session_retention(std::time::Duration::ZERO),
        );
        registry.join("s1", "a", "A", None, None).await.unwrap();
        registry.leave("s1", "a", None).await;
        assert!(registry.session_info("s1").await.is_some());

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        registry.cleanup().await;
        assert!(registry.session_info("s1").await.is_none());
    }

    #[tokio::test]
    async fn test_stats_counters() {
        let registry = SessionRegistry::new();
        registry.join("s1", "a", "A", None, None).await.unwrap();
        registry.join("s1", "b", "B", None, None).await.unwrap();
        registry.send_chat("s1", "a", "hi", None).await;
        registry
            .draw("s1", "a", serde_json::json!({ "x": 1 }))
            .await;
        registry.start_recording("s1", "a").await.unwrap();
        registry.stop_recording("s1", "a").await.unwrap();

        let stats = registry.stats().await;
        assert_eq!(stats.active_sessions, 1);
        assert_eq!(stats.sessions_created, 1);
        assert_eq!(stats.participants_served, 2);
        assert_eq!(stats.messages_sent, 1);
        assert_eq!(stats.whiteboard_actions, 1);
        assert_eq!(stats.recordings_stored, 1);
    }
}
