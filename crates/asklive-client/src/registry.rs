//! One live session per room.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::RoomSession;

enum Slot {
    /// An open is in progress; the slot is reserved.
    Opening,
    Ready(Arc<RoomSession>),
}

/// Releases an `Opening` reservation when an open fails or its future is
/// abandoned mid-await; disarmed once the slot holds a live session.
struct Reservation<'a> {
    sessions: &'a Mutex<HashMap<String, Slot>>,
    room_id: &'a str,
    armed: bool,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.sessions.lock().remove(self.room_id);
        }
    }
}

/// Hands out room sessions while enforcing the one-subscription-per-room
/// rule for this process.
///
/// Owned by the embedding application, not a process-wide singleton; two
/// registries do not coordinate.
pub struct SessionRegistry {
    config: ClientConfig,
    sessions: Mutex<HashMap<String, Slot>>,
}

impl SessionRegistry {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Open a session for `room_id`.
    ///
    /// Fails with [`ClientError::AlreadySubscribed`] while a live session
    /// for the room exists or another open for it is in progress. A slot
    /// whose session was closed directly is reclaimed.
    pub async fn open(&self, room_id: &str) -> Result<Arc<RoomSession>> {
        {
            let mut sessions = self.sessions.lock();
            match sessions.get(room_id) {
                Some(Slot::Opening) => {
                    return Err(ClientError::AlreadySubscribed(room_id.to_string()));
                }
                Some(Slot::Ready(session)) if !session.is_closed() => {
                    return Err(ClientError::AlreadySubscribed(room_id.to_string()));
                }
                _ => {}
            }
            sessions.insert(room_id.to_string(), Slot::Opening);
        }

        let mut reservation = Reservation {
            sessions: &self.sessions,
            room_id,
            armed: true,
        };
        let session = Arc::new(RoomSession::open(self.config.clone(), room_id).await?);
        self.sessions
            .lock()
            .insert(room_id.to_string(), Slot::Ready(Arc::clone(&session)));
        reservation.armed = false;
        Ok(session)
    }

    /// The live session for `room_id`, if any.
    pub fn get(&self, room_id: &str) -> Option<Arc<RoomSession>> {
        match self.sessions.lock().get(room_id) {
            Some(Slot::Ready(session)) if !session.is_closed() => Some(Arc::clone(session)),
            _ => None,
        }
    }

    /// Close and release the room's session. Returns whether one was live.
    pub fn close(&self, room_id: &str) -> bool {
        match self.sessions.lock().remove(room_id) {
            Some(Slot::Ready(session)) => {
                let was_live = !session.is_closed();
                session.close();
                was_live
            }
            _ => false,
        }
    }
}
