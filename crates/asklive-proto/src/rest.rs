//! REST request and response bodies.
//!
//! Field names follow the server's JSON exactly; the core crate maps them
//! into its own `Message` type.

use serde::{Deserialize, Serialize};

/// One message record from `GET /api/rooms/{room_id}/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub id: String,
    pub room_id: String,
    /// The question text. The server calls this field `message`.
    pub message: String,
    pub reaction_count: i64,
    pub answered: bool,
}

/// Snapshot response. The server encodes an empty room as
/// `"messages": null`, which must read as "no messages", not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRoomMessagesResponse {
    #[serde(default)]
    pub messages: Option<Vec<ApiMessage>>,
}

/// A room record from `GET /api/rooms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub theme: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRoomsResponse {
    #[serde(default)]
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub theme: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMessageResponse {
    pub id: String,
}

/// `PATCH .../reactions` response: the confirmed absolute count. The
/// matching `message_reaction_created` event carries the same number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactToMessageResponse {
    pub id: String,
    pub reactions: i64,
}
