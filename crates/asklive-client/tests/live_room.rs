//! End-to-end exercise against an in-process mock of the asklive server:
//! REST snapshot and submission endpoints plus the subscription socket.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use asklive_client::{ApiClient, ClientConfig, ClientError, RoomSession, SessionRegistry};
use asklive_core::{MessageView, ReactionToggle};
use asklive_proto::RoomEvent;
use axum::{
    Json, Router,
    extract::{Path, State, WebSocketUpgrade, ws::Message as WsMessage},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use parking_lot::Mutex;
use tokio::sync::broadcast;

#[derive(Clone)]
struct MockState {
    events: broadcast::Sender<String>,
    snapshot: Arc<serde_json::Value>,
    missing_room: Arc<AtomicBool>,
    stall_snapshot: Arc<AtomicBool>,
    fail_reactions: Arc<AtomicBool>,
    reactions: Arc<AtomicI64>,
    rooms: Arc<Mutex<Vec<serde_json::Value>>>,
}

struct Mock {
    addr: SocketAddr,
    state: MockState,
}

impl Mock {
    async fn spawn(snapshot: serde_json::Value) -> Self {
        let (events, _) = broadcast::channel(64);
        let state = MockState {
            events,
            snapshot: Arc::new(snapshot),
            missing_room: Arc::new(AtomicBool::new(false)),
            stall_snapshot: Arc::new(AtomicBool::new(false)),
            fail_reactions: Arc::new(AtomicBool::new(false)),
            reactions: Arc::new(AtomicI64::new(0)),
            rooms: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/subscribers/{room_id}", get(subscribe))
            .route("/api/rooms", post(create_room).get(list_rooms))
            .route(
                "/api/rooms/{room_id}/messages",
                get(get_messages).post(create_message),
            )
            .route(
                "/api/rooms/{room_id}/messages/{message_id}/reactions",
                patch(react).delete(unreact),
            )
            .route(
                "/api/rooms/{room_id}/messages/{message_id}/answers",
                patch(answer),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    fn config(&self) -> ClientConfig {
        ClientConfig::new(format!("http://{}", self.addr))
    }

    fn push(&self, event: &RoomEvent) {
        let _ = self
            .state
            .events
            .send(serde_json::to_string(event).unwrap());
    }
}

async fn subscribe(
    Path(_room_id): Path<String>,
    State(state): State<MockState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    // Subscribe before upgrading so no event pushed after the handshake
    // can be missed.
    let mut events = state.events.subscribe();
    ws.on_upgrade(move |mut socket| async move {
        while let Ok(frame) = events.recv().await {
            if socket.send(WsMessage::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn get_messages(
    Path(_room_id): Path<String>,
    State(state): State<MockState>,
) -> impl IntoResponse {
    if state.missing_room.load(Ordering::SeqCst) {
        return StatusCode::NOT_FOUND.into_response();
    }
    if state.stall_snapshot.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
    Json((*state.snapshot).clone()).into_response()
}

async fn create_room(
    State(state): State<MockState>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let id = uuid::Uuid::new_v4().to_string();
    state.rooms.lock().push(serde_json::json!({
        "id": id,
        "theme": body["theme"].as_str().unwrap_or_default(),
    }));
    (StatusCode::CREATED, Json(serde_json::json!({ "id": id })))
}

async fn list_rooms(State(state): State<MockState>) -> impl IntoResponse {
    let rooms = state.rooms.lock().clone();
    Json(serde_json::json!({ "rooms": rooms }))
}

async fn create_message(
    Path(_room_id): Path<String>,
    State(state): State<MockState>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let id = uuid::Uuid::new_v4().to_string();
    let event = RoomEvent::MessageCreated {
        id: id.clone(),
        message: body["message"].as_str().unwrap_or_default().to_string(),
    };
    let _ = state.events.send(serde_json::to_string(&event).unwrap());
    (StatusCode::CREATED, Json(serde_json::json!({ "id": id })))
}

async fn react(
    Path((_room_id, message_id)): Path<(String, String)>,
    State(state): State<MockState>,
) -> impl IntoResponse {
    if state.fail_reactions.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let reactions = state.reactions.fetch_add(1, Ordering::SeqCst) + 1;
    let event = RoomEvent::MessageReactionCreated {
        id: message_id.clone(),
        reactions,
    };
    let _ = state.events.send(serde_json::to_string(&event).unwrap());
    (
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": message_id, "reactions": reactions })),
    )
        .into_response()
}

async fn unreact(
    Path((_room_id, message_id)): Path<(String, String)>,
    State(state): State<MockState>,
) -> impl IntoResponse {
    if state.fail_reactions.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let current = state.reactions.load(Ordering::SeqCst);
    if current == 0 {
        // Same as the real server: nothing to remove, no event.
        return StatusCode::NO_CONTENT.into_response();
    }
    let reactions = current - 1;
    state.reactions.store(reactions, Ordering::SeqCst);
    let event = RoomEvent::MessageReactionDeleted {
        id: message_id,
        reactions,
    };
    let _ = state.events.send(serde_json::to_string(&event).unwrap());
    StatusCode::NO_CONTENT.into_response()
}

async fn answer(
    Path((_room_id, message_id)): Path<(String, String)>,
    State(state): State<MockState>,
) -> impl IntoResponse {
    let event = RoomEvent::MessageAnswered { id: message_id };
    let _ = state.events.send(serde_json::to_string(&event).unwrap());
    StatusCode::NO_CONTENT
}

fn one_message_snapshot() -> serde_json::Value {
    serde_json::json!({
        "messages": [{
            "id": "m1",
            "room_id": "r1",
            "message": "Hi",
            "reaction_count": 0,
            "answered": false,
        }]
    })
}

/// Wait until the session's view satisfies `predicate`, driven by the
/// change signal.
async fn wait_for(session: &RoomSession, predicate: impl Fn(&[MessageView]) -> bool) {
    let mut changed = session.changed();
    for _ in 0..50 {
        if predicate(&session.messages()) {
            return;
        }
        let _ = tokio::time::timeout(Duration::from_millis(200), changed.changed()).await;
    }
    panic!("view never reached expected state: {:?}", session.messages());
}

#[tokio::test]
async fn test_snapshot_then_events() {
    let mock = Mock::spawn(one_message_snapshot()).await;
    let session = RoomSession::open(mock.config(), "r1").await.unwrap();

    let view = session.messages();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].text, "Hi");

    mock.push(&RoomEvent::MessageReactionCreated {
        id: "m1".to_string(),
        reactions: 3,
    });
    wait_for(&session, |v| v[0].reaction_count == 3).await;

    mock.push(&RoomEvent::MessageAnswered { id: "m1".to_string() });
    wait_for(&session, |v| v[0].answered).await;

    // Duplicate creation for a known id is a no-op; a second message
    // afterwards proves the stream kept flowing.
    mock.push(&RoomEvent::MessageCreated {
        id: "m1".to_string(),
        message: "dup".to_string(),
    });
    mock.push(&RoomEvent::MessageCreated {
        id: "m2".to_string(),
        message: "Second".to_string(),
    });
    wait_for(&session, |v| v.len() == 2).await;

    let view = session.messages();
    // m1 ranks first (3 reactions) and kept its original text.
    assert_eq!(view[0].id, "m1");
    assert_eq!(view[0].text, "Hi");
    assert_eq!(view[0].reaction_count, 3);
    assert!(view[0].answered);
    assert_eq!(view[1].id, "m2");
}

#[tokio::test]
async fn test_null_snapshot_is_an_empty_room() {
    let mock = Mock::spawn(serde_json::json!({ "messages": null })).await;
    let session = RoomSession::open(mock.config(), "r1").await.unwrap();
    assert!(session.messages().is_empty());

    mock.push(&RoomEvent::MessageCreated {
        id: "m1".to_string(),
        message: "First".to_string(),
    });
    wait_for(&session, |v| v.len() == 1).await;
}

#[tokio::test]
async fn test_missing_room_fails_snapshot_load() {
    let mock = Mock::spawn(one_message_snapshot()).await;
    mock.state.missing_room.store(true, Ordering::SeqCst);

    let err = RoomSession::open(mock.config(), "nope").await.unwrap_err();
    assert!(matches!(err, ClientError::RoomNotFound(_)));
}

#[tokio::test]
async fn test_optimistic_toggle_round_trip() {
    let mock = Mock::spawn(one_message_snapshot()).await;
    let session = RoomSession::open(mock.config(), "r1").await.unwrap();

    let toggle = session.toggle_reaction("m1").await.unwrap();
    assert_eq!(toggle, ReactionToggle::Reacted);
    // The local flag flips on confirmation; the count follows only when
    // the event lands.
    assert!(session.messages()[0].has_reacted_locally);
    wait_for(&session, |v| v[0].reaction_count == 1).await;

    let toggle = session.toggle_reaction("m1").await.unwrap();
    assert_eq!(toggle, ReactionToggle::Idle);
    wait_for(&session, |v| v[0].reaction_count == 0).await;
    assert!(!session.messages()[0].has_reacted_locally);
}

#[tokio::test]
async fn test_zero_count_retract_settles_to_idle() {
    let mock = Mock::spawn(one_message_snapshot()).await;
    let session = RoomSession::open(mock.config(), "r1").await.unwrap();

    let toggle = session.toggle_reaction("m1").await.unwrap();
    assert_eq!(toggle, ReactionToggle::Reacted);
    wait_for(&session, |v| v[0].reaction_count == 1).await;

    // Another client removes the last reaction before we retract ours.
    mock.state.reactions.store(0, Ordering::SeqCst);
    mock.push(&RoomEvent::MessageReactionDeleted {
        id: "m1".to_string(),
        reactions: 0,
    });
    wait_for(&session, |v| v[0].reaction_count == 0).await;

    // The retract finds nothing to remove: 204 without an event. The
    // toggle still settles and the count stays where the stream put it.
    let toggle = session.toggle_reaction("m1").await.unwrap();
    assert_eq!(toggle, ReactionToggle::Idle);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let view = session.messages();
    assert_eq!(view[0].reaction_count, 0);
    assert!(!view[0].has_reacted_locally);
    assert_eq!(view[0].toggle, ReactionToggle::Idle);
}

#[tokio::test]
async fn test_failed_reaction_rolls_back() {
    let mock = Mock::spawn(one_message_snapshot()).await;
    let session = RoomSession::open(mock.config(), "r1").await.unwrap();
    mock.state.fail_reactions.store(true, Ordering::SeqCst);

    let err = session.toggle_reaction("m1").await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 500, .. }));

    let view = session.messages();
    assert_eq!(view[0].toggle, ReactionToggle::Idle);
    assert!(!view[0].has_reacted_locally);
    assert_eq!(view[0].reaction_count, 0);
}

#[tokio::test]
async fn test_submit_and_answer_flow() {
    let mock = Mock::spawn(serde_json::json!({ "messages": null })).await;
    let session = RoomSession::open(mock.config(), "r1").await.unwrap();

    let id = session.submit_message("What about lifetimes?").await.unwrap();
    // No optimistic insert: the message arrives via its event.
    wait_for(&session, |v| v.iter().any(|m| m.id == id)).await;
    assert_eq!(session.messages()[0].text, "What about lifetimes?");

    session.mark_answered(&id).await.unwrap();
    wait_for(&session, |v| v[0].answered).await;
}

#[tokio::test]
async fn test_registry_enforces_one_session_per_room() {
    let mock = Mock::spawn(one_message_snapshot()).await;
    let registry = SessionRegistry::new(mock.config());

    let session = registry.open("r1").await.unwrap();
    let err = registry.open("r1").await.unwrap_err();
    assert!(matches!(err, ClientError::AlreadySubscribed(_)));

    // A different room is its own slot.
    let other = registry.open("r2").await.unwrap();
    assert_eq!(other.room_id(), "r2");

    assert!(registry.close("r1"));
    assert!(session.is_closed());
    assert!(!registry.close("r1"));

    let reopened = registry.open("r1").await.unwrap();
    assert_eq!(reopened.room_id(), "r1");
}

#[tokio::test]
async fn test_abandoned_open_releases_the_room_slot() {
    let mock = Mock::spawn(one_message_snapshot()).await;
    mock.state.stall_snapshot.store(true, Ordering::SeqCst);
    let registry = SessionRegistry::new(mock.config());

    // Give up on an open stuck in the snapshot fetch. Dropping the
    // future must release the room's reservation.
    let abandoned = tokio::time::timeout(Duration::from_millis(200), registry.open("r1")).await;
    assert!(abandoned.is_err());

    mock.state.stall_snapshot.store(false, Ordering::SeqCst);
    let session = registry.open("r1").await.unwrap();
    assert_eq!(session.room_id(), "r1");
}

#[tokio::test]
async fn test_close_stops_event_application() {
    let mock = Mock::spawn(one_message_snapshot()).await;
    let session = RoomSession::open(mock.config(), "r1").await.unwrap();

    session.close();
    mock.push(&RoomEvent::MessageCreated {
        id: "m2".to_string(),
        message: "too late".to_string(),
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Last-known state is still served, but nothing new was merged.
    assert_eq!(session.messages().len(), 1);

    let err = session.toggle_reaction("m1").await.unwrap_err();
    assert!(matches!(err, ClientError::SessionClosed));
    let err = session.submit_message("late").await.unwrap_err();
    assert!(matches!(err, ClientError::SessionClosed));

    let rendered = format!("{session:?}");
    assert!(rendered.contains("\"r1\""));
    assert!(rendered.contains("closed: true"));
}

#[tokio::test]
async fn test_room_management_rest() {
    let mock = Mock::spawn(one_message_snapshot()).await;
    let api = ApiClient::new(mock.config());

    let id = api.create_room("rust q&a").await.unwrap();
    let rooms = api.list_rooms().await.unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, id);
    assert_eq!(rooms[0].theme, "rust q&a");
}
