//! Wire types for the asklive realtime Q&A protocol.
//!
//! The server pushes one JSON event per WebSocket text frame, shaped as a
//! discriminated `{ "kind": ..., "value": ... }` payload, and serves the
//! snapshot and submission endpoints over plain JSON REST. This crate holds
//! both halves of that contract and nothing else; state semantics live in
//! `asklive-core`.

pub mod event;
pub mod rest;

pub use event::RoomEvent;
pub use rest::{
    ApiMessage, CreateMessageRequest, CreateMessageResponse, CreateRoomRequest,
    CreateRoomResponse, GetRoomMessagesResponse, GetRoomsResponse, ReactToMessageResponse, Room,
};
