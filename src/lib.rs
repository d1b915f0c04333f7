//! In-memory session engine for live many-to-one coaching rooms
//!
//! A host and a bounded set of participants share a whiteboard, a chat, an
//! exclusive screen-sharing slot, and an optional recording, synchronized in
//! real time. All state lives in memory for the session's lifetime; a
//! reconnecting client re-joins and receives a full snapshot rather than an
//! event replay.
//!
//! The engine is transport-agnostic: the surrounding application owns the
//! sockets, deserializes frames into [`ClientEvent`]s, and hands each
//! connection's outbound half to the [`Dispatcher`]. Everything stateful runs
//! inside a per-session critical section; delivery is best-effort and never
//! rolls back committed state.
//!
//! ```no_run
//! use std::sync::Arc;
//! use liveroom::{ConnectionRegistry, Dispatcher, SessionRegistry};
//!
//! # async fn run() {
//! let registry = Arc::new(SessionRegistry::new());
//! let _cleanup = registry.spawn_cleanup_task();
//! let dispatcher = Dispatcher::new(registry, Arc::new(ConnectionRegistry::new()));
//!
//! let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
//! let _conn = dispatcher.connect(tx).await;
//! // feed inbound frames: dispatcher.handle_event(conn, event).await
//! // on socket close:     dispatcher.disconnect(conn).await
//! # }
//! ```

pub mod chat;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod recording;
pub mod screenshare;
pub mod session;
pub mod stats;
pub mod whiteboard;

pub use chat::{ChatMessage, MessageKind};
pub use config::EngineConfig;
pub use connection::{ConnectionId, ConnectionRegistry};
pub use dispatch::{Audience, ClientEvent, Dispatcher, Outbound, ServerEvent};
pub use error::EngineError;
pub use recording::{RecordingRecord, RecordingStore};
pub use screenshare::ScreenShare;
pub use session::{
    ParticipantInfo, Role, SessionInfo, SessionRegistry, SessionSettings, SessionSnapshot,
};
pub use stats::{EngineStats, StatsSnapshot};
pub use whiteboard::{Stroke, Whiteboard};
