//! Per-room message store and the event reducer that mutates it.

use std::collections::HashMap;

use asklive_proto::RoomEvent;

use crate::message::{Message, MessageView};
use crate::toggle::{ReactionToggle, ToggleRequest};

/// All client-side state for one room.
///
/// Owned by exactly one session at a time: created on room activation,
/// replaced wholesale when the snapshot loads, destroyed when the room is
/// deactivated. Messages for different rooms never share a store.
///
/// `order` remembers the sequence in which ids first appeared (snapshot
/// order, then event arrival order); it is the tie-break for equal
/// reaction counts in [`RoomState::ranked`].
#[derive(Debug, Default, Clone)]
pub struct RoomState {
    messages: HashMap<String, Message>,
    order: Vec<String>,
    toggles: HashMap<String, ReactionToggle>,
}

impl RoomState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole store with a freshly fetched snapshot.
    ///
    /// Duplicate ids keep the first occurrence. Toggle state survives for
    /// ids still present; toggles for vanished messages are dropped.
    pub fn load_snapshot(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.clear();
        self.order.clear();
        for message in messages {
            if self.messages.contains_key(&message.id) {
                continue;
            }
            self.order.push(message.id.clone());
            self.messages.insert(message.id.clone(), message);
        }
        let messages = &self.messages;
        self.toggles.retain(|id, _| messages.contains_key(id));
    }

    /// Fold one server-pushed event into the store.
    ///
    /// Total over all inputs: redelivered creations, events for ids this
    /// store has never seen, and unknown kinds all reduce to a no-op
    /// rather than an error. Returns whether anything changed so callers
    /// can skip redundant change notifications.
    pub fn apply(&mut self, event: &RoomEvent) -> bool {
        match event {
            RoomEvent::MessageCreated { id, message } => {
                if self.messages.contains_key(id) {
                    // Redelivered frame; the first insert won.
                    return false;
                }
                self.order.push(id.clone());
                self.messages
                    .insert(id.clone(), Message::new(id.clone(), message.clone()));
                true
            }
            RoomEvent::MessageAnswered { id } => match self.messages.get_mut(id) {
                Some(message) if !message.answered => {
                    message.answered = true;
                    true
                }
                Some(_) => false,
                None => {
                    tracing::debug!(message_id = %id, "answered event for unknown message");
                    false
                }
            },
            RoomEvent::MessageReactionCreated { id, reactions }
            | RoomEvent::MessageReactionDeleted { id, reactions } => {
                let Some(message) = self.messages.get_mut(id) else {
                    tracing::debug!(message_id = %id, "reaction event for unknown message");
                    return false;
                };
                // Absolute overwrite, clamped: the server never goes below
                // zero, but a malformed frame must not either.
                let count = u64::try_from(*reactions).unwrap_or(0);
                if message.reaction_count == count {
                    return false;
                }
                message.reaction_count = count;
                true
            }
            RoomEvent::Unknown => false,
        }
    }

    /// Messages ranked by reaction count, most reacted first. Equal counts
    /// keep their original insertion order (stable sort).
    pub fn ranked(&self) -> Vec<&Message> {
        let mut ranked: Vec<&Message> = self
            .order
            .iter()
            .filter_map(|id| self.messages.get(id))
            .collect();
        ranked.sort_by(|a, b| b.reaction_count.cmp(&a.reaction_count));
        ranked
    }

    /// Ranked presentation views, each carrying its local reaction state.
    pub fn views(&self) -> Vec<MessageView> {
        self.ranked()
            .into_iter()
            .map(|message| {
                let toggle = self.toggle(&message.id);
                MessageView {
                    id: message.id.clone(),
                    text: message.text.clone(),
                    reaction_count: message.reaction_count,
                    answered: message.answered,
                    has_reacted_locally: toggle.has_reacted_locally(),
                    toggle,
                }
            })
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.get(id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Toggle state for a message; `Idle` when it was never toggled.
    pub fn toggle(&self, id: &str) -> ReactionToggle {
        self.toggles.get(id).copied().unwrap_or_default()
    }

    /// Start a reaction toggle for `id`.
    ///
    /// `None` when a request is already in flight (re-entrant clicks are
    /// dropped) or the message is unknown to this store.
    pub fn begin_toggle(&mut self, id: &str) -> Option<ToggleRequest> {
        if !self.messages.contains_key(id) {
            return None;
        }
        self.toggles.entry(id.to_string()).or_default().begin()
    }

    /// Settle the in-flight toggle for `id` with the request outcome.
    /// The reaction count is untouched; only the matching event moves it.
    pub fn settle_toggle(&mut self, id: &str, success: bool) {
        if let Some(toggle) = self.toggles.get_mut(id) {
            toggle.settle(success);
        }
    }
}
