//! Watch a room from the terminal.
//!
//! Subscribes to a room and reprints the ranked question list whenever
//! its state changes:
//!
//! ```text
//! room-watch <room-id> [http-base]
//! ```

use asklive_client::{ClientConfig, RoomSession};
use asklive_core::MessageView;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(room_id) = args.next() else {
        anyhow::bail!("usage: room-watch <room-id> [http-base]");
    };
    let http_base = args
        .next()
        .unwrap_or_else(|| "http://localhost:8080".to_string());

    let session = RoomSession::open(ClientConfig::new(http_base), &room_id).await?;
    let mut changed = session.changed();

    loop {
        print_room(&room_id, &session.messages());
        if changed.changed().await.is_err() {
            break;
        }
    }
    Ok(())
}

fn print_room(room_id: &str, messages: &[MessageView]) {
    println!("room {room_id}: {} question(s)", messages.len());
    for (rank, view) in messages.iter().enumerate() {
        println!(
            "{:>3}. [{}{}] {} ({} reactions)",
            rank + 1,
            if view.answered { "answered" } else { "open" },
            if view.has_reacted_locally { ", reacted" } else { "" },
            view.text,
            view.reaction_count
        );
    }
}
