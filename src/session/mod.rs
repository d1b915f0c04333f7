//! Session lifecycle and orchestration
//!
//! The [`SessionRegistry`] is the control-flow hub: it owns every live
//! [`Session`], admits and removes participants, migrates the host role, and
//! drives the whiteboard, screen-share, and recording components. Each
//! session is serialized behind its own mutex; cross-session operations run
//! in parallel.

pub mod participant;
pub mod registry;
pub mod room;
pub mod snapshot;

pub use participant::{Participant, ParticipantInfo, Role};
pub use registry::SessionRegistry;
pub use room::{Session, SessionSettings};
pub use snapshot::{SessionArchive, SessionInfo, SessionRecord, SessionSnapshot};
