//! Event dispatch
//!
//! Inbound client events become [`SessionRegistry`](crate::session::SessionRegistry)
//! calls; the resulting notifications fan out to the room through the
//! connection registry.
//!
//! # Control flow
//!
//! ```text
//!   transport frame ──► Dispatcher::handle_event(conn, ClientEvent)
//!        │                     │
//!        │                     ├─► ConnectionRegistry  (resolve binding)
//!        │                     ├─► SessionRegistry     (serialized mutation)
//!        │                     │        └─► Vec<Outbound>
//!        │                     └─► deliver: Sender / Others / Room multicast
//!        ▼
//!   disconnect ──► Dispatcher::disconnect(conn)  (leave exactly once)
//! ```

pub mod dispatcher;
pub mod event;

pub use dispatcher::Dispatcher;
pub use event::{Audience, ClientEvent, Outbound, ServerEvent};
