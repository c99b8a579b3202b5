//! WebSocket subscription transport.
//!
//! One connection per room. Frames are decoded on the read task and handed
//! over an mpsc channel in arrival order; that channel is the FIFO
//! boundary the session's reducer loop consumes from. Reconnecting after a
//! drop is left to the embedding application: the reducer tolerates a
//! gapped stream, but this module never resubscribes on its own.

use asklive_proto::RoomEvent;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::config::ClientConfig;
use crate::error::Result;

/// Frames buffered between the socket and the reducer loop.
const EVENT_BUFFER: usize = 256;

pub(crate) struct Subscription {
    pub events: mpsc::Receiver<RoomEvent>,
    pub reader: JoinHandle<()>,
}

/// Connect to the room's subscription endpoint and start reading frames.
pub(crate) async fn subscribe(config: &ClientConfig, room_id: &str) -> Result<Subscription> {
    let url = config.subscribe_url(room_id);
    let (stream, _) = connect_async(url).await?;
    tracing::info!(room_id = %room_id, "subscribed to room events");

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let room_id = room_id.to_string();
    let reader = tokio::spawn(async move {
        let (_, mut frames) = stream.split();
        while let Some(frame) = frames.next().await {
            match frame {
                Ok(Message::Text(text)) => match serde_json::from_str::<RoomEvent>(&text) {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            // Session dropped the receiver.
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(room_id = %room_id, error = %err, "dropping undecodable frame");
                    }
                },
                Ok(Message::Close(_)) => {
                    tracing::info!(room_id = %room_id, "server closed the subscription");
                    break;
                }
                // Ping/pong and binary frames carry no events.
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(room_id = %room_id, error = %err, "subscription transport failed");
                    break;
                }
            }
        }
    });

    Ok(Subscription { events: rx, reader })
}
