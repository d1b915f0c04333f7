//! Session recording
//!
//! While active, a per-session [`RecordingCapsule`] mirrors whiteboard events
//! into a capture buffer. Stopping the capture materializes an immutable
//! [`RecordingRecord`] which is handed off to the process-wide
//! [`RecordingStore`], where it outlives the session.

pub mod capsule;
pub mod record;
pub mod store;

pub use capsule::{CapturedEvent, RecordingCapsule};
pub use record::RecordingRecord;
pub use store::RecordingStore;
