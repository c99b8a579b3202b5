//! Client error taxonomy.
//!
//! Everything here is recoverable from the caller's point of view: a
//! failed submission rolls the toggle back, a failed snapshot leaves the
//! room uninitialized, and a dropped transport leaves the session serving
//! last-known state.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("websocket transport failed: {0}")]
    Websocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("server answered {status} to {action}")]
    Status { status: u16, action: &'static str },

    #[error("room not found: {0}")]
    RoomNotFound(String),

    #[error("a session for room {0} is already active")]
    AlreadySubscribed(String),

    #[error("room session is closed")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, ClientError>;
