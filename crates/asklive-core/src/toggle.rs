//! Optimistic reaction toggle state machine.

use serde::{Deserialize, Serialize};

/// What the controller must send to the server for a begun toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleRequest {
    /// Add this client's reaction.
    Submit,
    /// Remove this client's reaction.
    Retract,
}

/// Client-local reaction state for one message.
///
/// The toggle never touches the displayed reaction count: the count only
/// moves when the matching server event arrives, so there is a window
/// where the local flag has flipped but the count has not. That window is
/// part of the contract; do not close it by incrementing locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionToggle {
    /// No reaction from this client, no request in flight.
    #[default]
    Idle,
    /// Add-reaction request in flight.
    Reacting,
    /// This client's reaction was confirmed.
    Reacted,
    /// Remove-reaction request in flight.
    Unreacting,
}

impl ReactionToggle {
    /// Begin a toggle. Returns the request to issue, or `None` while a
    /// previous request is still in flight (re-entrant clicks are
    /// dropped so a message never has two requests in flight).
    pub fn begin(&mut self) -> Option<ToggleRequest> {
        match self {
            Self::Idle => {
                *self = Self::Reacting;
                Some(ToggleRequest::Submit)
            }
            Self::Reacted => {
                *self = Self::Unreacting;
                Some(ToggleRequest::Retract)
            }
            Self::Reacting | Self::Unreacting => None,
        }
    }

    /// Settle the in-flight request: advance on success, roll back to the
    /// prior state on failure. No-op when nothing is in flight.
    pub fn settle(&mut self, success: bool) {
        *self = match (*self, success) {
            (Self::Reacting, true) => Self::Reacted,
            (Self::Reacting, false) => Self::Idle,
            (Self::Unreacting, true) => Self::Idle,
            (Self::Unreacting, false) => Self::Reacted,
            (state, _) => state,
        };
    }

    /// Whether this client believes it has an active reaction.
    ///
    /// Advisory UI state only: it decides which action the next click
    /// issues and is never reconciled against reaction events caused by
    /// other clients.
    pub fn has_reacted_locally(self) -> bool {
        matches!(self, Self::Reacted | Self::Unreacting)
    }

    pub fn in_flight(self) -> bool {
        matches!(self, Self::Reacting | Self::Unreacting)
    }
}
