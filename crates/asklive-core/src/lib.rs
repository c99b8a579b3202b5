//! asklive Core Library
//!
//! Headless room state for the asklive realtime Q&A client: the per-room
//! message store, the reducer that folds server-pushed events into it, the
//! optimistic reaction toggle state machine, and the ranked presentation
//! view.
//!
//! Nothing here performs I/O or owns a runtime. The `asklive-client` crate
//! drives these types from its transport and serializes all mutation per
//! room; within that discipline every operation in this crate is
//! deterministic.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]

pub mod message;
pub mod room;
pub mod toggle;

pub use message::{Message, MessageView};
pub use room::RoomState;
pub use toggle::{ReactionToggle, ToggleRequest};
