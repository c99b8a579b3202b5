//! Message entities and their presentation projection.

use serde::{Deserialize, Serialize};

use crate::toggle::ReactionToggle;

/// A question posted to a room.
///
/// `reaction_count` is server-authoritative: the client never increments
/// it locally, it only overwrites it with the absolute count carried by
/// reaction events. `answered` flips to true exactly once; there is no
/// un-answer transition. `text` is immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub reaction_count: u64,
    pub answered: bool,
}

impl Message {
    /// A freshly created message: zero reactions, not answered.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            reaction_count: 0,
            answered: false,
        }
    }
}

/// Read-only view of one message for rendering: the server-side fields
/// plus this client's local reaction state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub id: String,
    pub text: String,
    pub reaction_count: u64,
    pub answered: bool,
    /// Whether this client believes it has an active reaction. Advisory
    /// UI state; see [`ReactionToggle::has_reacted_locally`].
    pub has_reacted_locally: bool,
    pub toggle: ReactionToggle,
}
