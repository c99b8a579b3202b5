//! Per-room session: subscription lifecycle, the serialized reducer loop,
//! and the optimistic reaction toggle controller.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use asklive_core::{Message, MessageView, ReactionToggle, RoomState, ToggleRequest};
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::transport;

/// State shared between the session handle and its reducer loop.
struct Shared {
    room_id: String,
    state: RwLock<RoomState>,
    closed: AtomicBool,
    revision: watch::Sender<u64>,
}

impl Shared {
    /// Run `mutate` under the write lock unless the session is torn down.
    /// Bumps the revision when the mutation reports a change.
    ///
    /// Both the reducer loop and the toggle paths go through here, which
    /// is what serializes them; `close` flips the flag under the same
    /// lock, so nothing mutates a torn-down room.
    fn mutate(&self, mutate: impl FnOnce(&mut RoomState) -> bool) -> bool {
        let mut state = self.state.write();
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }
        let changed = mutate(&mut state);
        drop(state);
        if changed {
            self.revision.send_modify(|revision| *revision += 1);
        }
        changed
    }
}

struct AbortOnDrop<'a> {
    tasks: [&'a JoinHandle<()>; 2],
    armed: bool,
}

impl Drop for AbortOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            for task in self.tasks {
                task.abort();
            }
        }
    }
}

/// Live view of one room.
///
/// Opening a session subscribes to the room's event stream and loads the
/// message snapshot; from then on the reducer loop is the only consumer
/// of the event channel and the displayed state stays merged. Dropping
/// the session closes it.
pub struct RoomSession {
    shared: Arc<Shared>,
    api: ApiClient,
    reader: JoinHandle<()>,
    reducer: JoinHandle<()>,
}

impl RoomSession {
    /// Subscribe to `room_id` and load its snapshot.
    ///
    /// The socket opens before the snapshot request so no event can slip
    /// between the two. An event that arrives while the snapshot is in
    /// flight is resolved by the snapshot's wholesale replace; later
    /// reaction events re-converge the counts (last write wins, same as
    /// the original cache-overwrite behavior this client mirrors).
    pub async fn open(config: ClientConfig, room_id: impl Into<String>) -> Result<Self> {
        let room_id = room_id.into();
        let api = ApiClient::new(config.clone());

        let transport::Subscription { mut events, reader } =
            transport::subscribe(&config, &room_id).await?;

        let (revision, _) = watch::channel(0u64);
        let shared = Arc::new(Shared {
            room_id: room_id.clone(),
            state: RwLock::new(RoomState::new()),
            closed: AtomicBool::new(false),
            revision,
        });

        let loop_shared = Arc::clone(&shared);
        let reducer = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if loop_shared.closed.load(Ordering::SeqCst) {
                    break;
                }
                loop_shared.mutate(|state| state.apply(&event));
            }
            tracing::debug!(room_id = %loop_shared.room_id, "reducer loop finished");
        });

        // Releases the connection tasks when the snapshot fetch fails or
        // this future is abandoned mid-await.
        let mut tasks = AbortOnDrop {
            tasks: [&reader, &reducer],
            armed: true,
        };
        let snapshot = api.fetch_messages(&room_id).await?;
        tasks.armed = false;
        drop(tasks);
        shared.mutate(|state| {
            state.load_snapshot(snapshot.into_iter().map(|m| Message {
                id: m.id,
                text: m.message,
                reaction_count: u64::try_from(m.reaction_count).unwrap_or(0),
                answered: m.answered,
            }));
            true
        });
        tracing::info!(room_id = %room_id, "room session opened");

        Ok(Self {
            shared,
            api,
            reader,
            reducer,
        })
    }

    pub fn room_id(&self) -> &str {
        &self.shared.room_id
    }

    /// Ranked presentation view: most reacted first, ties in insertion
    /// order, each message carrying its local reaction state.
    pub fn messages(&self) -> Vec<MessageView> {
        self.shared.state.read().views()
    }

    /// Change signal; the receiver resolves whenever room state mutates.
    pub fn changed(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// Toggle this client's reaction on a message and return the toggle
    /// state after the attempt.
    ///
    /// Clicks while a request is in flight (and toggles for ids this room
    /// does not know) are dropped without a request. The displayed count
    /// is never touched here; it moves when the matching event arrives.
    /// On a failed request the toggle rolls back and the error is
    /// returned.
    pub async fn toggle_reaction(&self, message_id: &str) -> Result<ReactionToggle> {
        if self.is_closed() {
            return Err(ClientError::SessionClosed);
        }

        let mut request = None;
        self.shared.mutate(|state| {
            request = state.begin_toggle(message_id);
            request.is_some()
        });
        let Some(request) = request else {
            return Ok(self.shared.state.read().toggle(message_id));
        };

        let outcome = match request {
            ToggleRequest::Submit => {
                self.api
                    .submit_reaction(&self.shared.room_id, message_id)
                    .await
            }
            ToggleRequest::Retract => {
                self.api
                    .retract_reaction(&self.shared.room_id, message_id)
                    .await
            }
        };

        // A session closed while the request was in flight swallows the
        // settlement; the torn-down state must not move.
        let success = outcome.is_ok();
        self.shared.mutate(|state| {
            state.settle_toggle(message_id, success);
            true
        });

        if let Err(err) = outcome {
            tracing::warn!(
                room_id = %self.shared.room_id,
                message_id = %message_id,
                error = %err,
                "reaction request failed, toggle rolled back"
            );
            return Err(err);
        }
        Ok(self.shared.state.read().toggle(message_id))
    }

    /// Post a new question to this room.
    pub async fn submit_message(&self, text: &str) -> Result<String> {
        if self.is_closed() {
            return Err(ClientError::SessionClosed);
        }
        self.api.submit_message(&self.shared.room_id, text).await
    }

    /// Presenter action: mark a question as answered. The flag flips in
    /// room state when the `message_answered` event arrives.
    pub async fn mark_answered(&self, message_id: &str) -> Result<()> {
        if self.is_closed() {
            return Err(ClientError::SessionClosed);
        }
        self.api
            .mark_answered(&self.shared.room_id, message_id)
            .await
    }

    /// Deactivate the room: no further event is applied once this
    /// returns, and the connection tasks are released. In-flight reaction
    /// requests may still complete but settle into nothing.
    pub fn close(&self) {
        {
            let _state = self.shared.state.write();
            if self.shared.closed.swap(true, Ordering::SeqCst) {
                return;
            }
        }
        self.reader.abort();
        self.reducer.abort();
        tracing::info!(room_id = %self.shared.room_id, "room session closed");
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for RoomSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomSession")
            .field("room_id", &self.shared.room_id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Drop for RoomSession {
    fn drop(&mut self) {
        self.close();
    }
}
