//! Server-pushed room events.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// One state change for a message, as delivered over the room's
/// subscription socket.
///
/// Decoding is defensive: a `kind` this client does not know about maps
/// to [`RoomEvent::Unknown`] no matter what its `value` carries, and
/// extra fields inside a known `value` are ignored. Reaction events carry
/// the absolute new count, not a delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RoomEvent {
    /// A new question was posted.
    MessageCreated { id: String, message: String },
    /// The presenter marked a question as answered.
    MessageAnswered { id: String },
    /// Someone reacted; `reactions` is the new total.
    MessageReactionCreated { id: String, reactions: i64 },
    /// Someone removed a reaction; `reactions` is the new total.
    MessageReactionDeleted { id: String, reactions: i64 },
    /// A kind introduced after this client was built.
    Unknown,
}

// Two-stage decode: tag first, then the payload for kinds we know. An
// unknown `kind` must never fail on whatever its `value` holds, which
// rules out the derived adjacently-tagged form.
impl<'de> Deserialize<'de> for RoomEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Frame {
            kind: String,
            #[serde(default)]
            value: serde_json::Value,
        }

        #[derive(Deserialize)]
        struct WithId {
            id: String,
        }

        #[derive(Deserialize)]
        struct Created {
            id: String,
            message: String,
        }

        #[derive(Deserialize)]
        struct Reaction {
            id: String,
            reactions: i64,
        }

        let Frame { kind, value } = Frame::deserialize(deserializer)?;
        let event = match kind.as_str() {
            "message_created" => {
                let Created { id, message } =
                    serde_json::from_value(value).map_err(de::Error::custom)?;
                Self::MessageCreated { id, message }
            }
            "message_answered" => {
                let WithId { id } = serde_json::from_value(value).map_err(de::Error::custom)?;
                Self::MessageAnswered { id }
            }
            "message_reaction_created" => {
                let Reaction { id, reactions } =
                    serde_json::from_value(value).map_err(de::Error::custom)?;
                Self::MessageReactionCreated { id, reactions }
            }
            "message_reaction_deleted" => {
                let Reaction { id, reactions } =
                    serde_json::from_value(value).map_err(de::Error::custom)?;
                Self::MessageReactionDeleted { id, reactions }
            }
            _ => Self::Unknown,
        };
        Ok(event)
    }
}

impl RoomEvent {
    /// The id of the message this event targets, when it targets one.
    pub fn message_id(&self) -> Option<&str> {
        match self {
            Self::MessageCreated { id, .. }
            | Self::MessageAnswered { id }
            | Self::MessageReactionCreated { id, .. }
            | Self::MessageReactionDeleted { id, .. } => Some(id),
            Self::Unknown => None,
        }
    }
}
