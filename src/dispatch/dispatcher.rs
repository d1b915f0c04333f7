//! Event dispatcher
//!
//! Translates inbound client events into [`SessionRegistry`] calls and fans
//! the resulting notifications out to the room. Each connection moves through
//! `Unbound -> Bound -> Closed`: a join binds it, a leave or disconnect
//! unbinds it exactly once even when both race.
//!
//! Handlers never block on delivery; state is committed in the registry
//! before any send, and sends are fire-and-forget.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::connection::{ConnectionId, ConnectionRegistry};
use crate::error::EngineError;
use crate::session::SessionRegistry;

use super::event::{Audience, ClientEvent, Outbound, ServerEvent};

/// Dispatcher wiring connections to the session registry
pub struct Dispatcher {
    registry: Arc<SessionRegistry>,
    connections: Arc<ConnectionRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over the given stores
    pub fn new(registry: Arc<SessionRegistry>, connections: Arc<ConnectionRegistry>) -> Self {
        Self {
            registry,
            connections,
        }
    }

    /// Get the session registry
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Get the connection registry
    pub fn connections(&self) -> &Arc<ConnectionRegistry> {
        &self.connections
    }

    /// Register a new transport connection
    ///
    /// The transport calls this on accept, handing over the send half of the
    /// connection's outbound channel. The connection starts unbound.
    pub async fn connect(&self, tx: UnboundedSender<ServerEvent>) -> ConnectionId {
        self.connections.register(tx).await
    }

    /// Handle one inbound event from a connection
    pub async fn handle_event(&self, conn: ConnectionId, event: ClientEvent) {
        match event {
            ClientEvent::JoinSession {
                session_id,
                participant_id,
                display_name,
                role,
            } => {
                self.handle_join(conn, &session_id, &participant_id, &display_name, role)
                    .await;
            }
            ClientEvent::LeaveSession { .. } => {
                // The binding, not the payload, says what to leave
                self.unbind_and_leave(conn).await;
            }
            ClientEvent::SendMessage {
                session_id,
                participant_id,
                message,
                kind,
            } => {
                let Some((session_id, participant_id)) =
                    self.bound(conn, &session_id, &participant_id).await
                else {
                    return;
                };
                let out = self
                    .registry
                    .send_chat(&session_id, &participant_id, &message, kind)
                    .await;
                self.deliver(conn, &session_id, out).await;
            }
            ClientEvent::WhiteboardDraw {
                session_id,
                participant_id,
                stroke,
            } => {
                let Some((session_id, participant_id)) =
                    self.bound(conn, &session_id, &participant_id).await
                else {
                    return;
                };
                let out = self
                    .registry
                    .draw(&session_id, &participant_id, stroke)
                    .await;
                self.deliver(conn, &session_id, out).await;
            }
            ClientEvent::WhiteboardClear {
                session_id,
                participant_id,
            } => {
                let Some((session_id, participant_id)) =
                    self.bound(conn, &session_id, &participant_id).await
                else {
                    return;
                };
                let out = self.registry.clear(&session_id, &participant_id).await;
                self.deliver(conn, &session_id, out).await;
            }
            ClientEvent::WhiteboardUndo {
                session_id,
                participant_id,
            } => {
                let Some((session_id, participant_id)) =
                    self.bound(conn, &session_id, &participant_id).await
                else {
                    return;
                };
                let out = self.registry.undo(&session_id, &participant_id).await;
                self.deliver(conn, &session_id, out).await;
            }
            ClientEvent::StartScreenShare {
                session_id,
                participant_id,
                stream_id,
            } => {
                let Some((session_id, participant_id)) =
                    self.bound(conn, &session_id, &participant_id).await
                else {
                    return;
                };
                match self
                    .registry
                    .start_screen_share(&session_id, &participant_id, &stream_id)
                    .await
                {
                    Ok(out) => self.deliver(conn, &session_id, out).await,
                    Err(err) => self.send_error(conn, err).await,
                }
            }
            ClientEvent::StopScreenShare {
                session_id,
                participant_id,
            } => {
                let Some((session_id, participant_id)) =
                    self.bound(conn, &session_id, &participant_id).await
                else {
                    return;
                };
                let out = self
                    .registry
                    .stop_screen_share(&session_id, &participant_id)
                    .await;
                self.deliver(conn, &session_id, out).await;
            }
            ClientEvent::StartRecording {
                session_id,
                participant_id,
            } => {
                let Some((session_id, participant_id)) =
                    self.bound(conn, &session_id, &participant_id).await
                else {
                    return;
                };
                match self
                    .registry
                    .start_recording(&session_id, &participant_id)
                    .await
                {
                    Ok(out) => self.deliver(conn, &session_id, out).await,
                    Err(err) => self.send_error(conn, err).await,
                }
            }
            ClientEvent::StopRecording {
                session_id,
                participant_id,
            } => {
                let Some((session_id, participant_id)) =
                    self.bound(conn, &session_id, &participant_id).await
                else {
                    return;
                };
                match self
                    .registry
                    .stop_recording(&session_id, &participant_id)
                    .await
                {
                    Ok(out) => self.deliver(conn, &session_id, out).await,
                    Err(err) => self.send_error(conn, err).await,
                }
            }
        }
    }

    /// Handle a raw transport disconnect
    ///
    /// Leaves the session if the connection was still bound, then forgets the
    /// connection. Safe to call after an explicit leave already unbound it,
    /// and after the participant rejoined on a newer connection.
    pub async fn disconnect(&self, conn: ConnectionId) {
        if let Some(binding) = self.connections.unregister(conn).await {
            let out = self
                .registry
                .leave(&binding.session_id, &binding.participant_id, Some(conn))
                .await;
            self.deliver(conn, &binding.session_id, out).await;
        }
    }

    async fn handle_join(
        &self,
        conn: ConnectionId,
        session_id: &str,
        participant_id: &str,
        display_name: &str,
        role: Option<crate::session::Role>,
    ) {
        if self.connections.binding(conn).await.is_some() {
            tracing::debug!(connection = conn, "Join ignored: already bound");
            return;
        }

        match self
            .registry
            .join(session_id, participant_id, display_name, role, Some(conn))
            .await
        {
            Ok(out) => {
                // Join and bind must be atomic: if the connection vanished
                // while the registry admitted the participant, undo the join.
                if !self.connections.bind(conn, session_id, participant_id).await {
                    self.registry.leave(session_id, participant_id, Some(conn)).await;
                    return;
                }
                self.deliver(conn, session_id, out).await;
            }
            Err(err) => self.send_error(conn, err).await,
        }
    }

    /// Unbind the connection and leave its session exactly once
    async fn unbind_and_leave(&self, conn: ConnectionId) {
        let Some(binding) = self.connections.take_binding(conn).await else {
            tracing::debug!(connection = conn, "Leave ignored: not bound");
            return;
        };

        let out = self
            .registry
            .leave(&binding.session_id, &binding.participant_id, Some(conn))
            .await;
        self.deliver(conn, &binding.session_id, out).await;
    }

    /// Resolve the connection's binding, rejecting payloads that disagree
    async fn bound(
        &self,
        conn: ConnectionId,
        session_id: &str,
        participant_id: &str,
    ) -> Option<(String, String)> {
        let binding = self.connections.binding(conn).await;
        let Some(binding) = binding else {
            tracing::debug!(connection = conn, "Event ignored: connection not bound");
            return None;
        };

        if binding.session_id != session_id || binding.participant_id != participant_id {
            tracing::debug!(
                connection = conn,
                bound_session = %binding.session_id,
                claimed_session = %session_id,
                "Event ignored: payload does not match binding"
            );
            return None;
        }

        Some((binding.session_id, binding.participant_id))
    }

    async fn deliver(&self, conn: ConnectionId, session_id: &str, out: Vec<Outbound>) {
        for notification in out {
            match notification.audience {
                Audience::Sender => self.connections.send(conn, notification.event).await,
                Audience::Others => {
                    self.connections
                        .multicast(session_id, Some(conn), &notification.event)
                        .await
                }
                Audience::Room => {
                    self.connections
                        .multicast(session_id, None, &notification.event)
                        .await
                }
            }
        }
    }

    async fn send_error(&self, conn: ConnectionId, err: EngineError) {
        let event = match &err {
            EngineError::SessionFull(session_id) => ServerEvent::SessionFull {
                session_id: session_id.clone(),
            },
            EngineError::ShareAlreadyActive => ServerEvent::ScreenShareError {
                message: err.to_string(),
            },
            _ => ServerEvent::RecordingError {
                message: err.to_string(),
            },
        };
        self.connections.send(conn, event).await;
    }
}
