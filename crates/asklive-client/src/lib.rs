//! asklive Client
//!
//! Tokio client for asklive rooms. A [`RoomSession`] fetches the message
//! snapshot over REST, subscribes to the room's WebSocket event stream,
//! and merges both into one per-room [`asklive_core::RoomState`] that
//! local optimistic reactions also write to. All mutation for a room is
//! serialized: events flow through a single-consumer channel into one
//! reducer loop, and that loop shares a single write lock with the
//! reaction toggle paths.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod api;
pub mod config;
pub mod error;
pub mod registry;
pub mod session;
mod transport;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use registry::SessionRegistry;
pub use session::RoomSession;
