//! Client endpoint configuration.

/// Where the asklive server lives.
///
/// The subscription socket shares a host with the REST API, so the ws
/// base is derived from the http base unless overridden with
/// [`ClientConfig::with_ws_base`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub http_base: String,
    pub ws_base: String,
}

impl ClientConfig {
    /// Build a config from the REST base URL, e.g. `http://localhost:8080`.
    pub fn new(http_base: impl Into<String>) -> Self {
        let http_base: String = http_base.into();
        let http_base = http_base.trim_end_matches('/').to_string();
        let ws_base = if let Some(rest) = http_base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = http_base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            format!("ws://{http_base}")
        };
        Self { http_base, ws_base }
    }

    pub fn with_ws_base(mut self, ws_base: impl Into<String>) -> Self {
        let ws_base: String = ws_base.into();
        self.ws_base = ws_base.trim_end_matches('/').to_string();
        self
    }

    pub(crate) fn rooms_url(&self) -> String {
        format!("{}/api/rooms", self.http_base)
    }

    pub(crate) fn messages_url(&self, room_id: &str) -> String {
        format!("{}/api/rooms/{room_id}/messages", self.http_base)
    }

    pub(crate) fn message_url(&self, room_id: &str, message_id: &str, leaf: &str) -> String {
        format!(
            "{}/api/rooms/{room_id}/messages/{message_id}/{leaf}",
            self.http_base
        )
    }

    pub(crate) fn subscribe_url(&self, room_id: &str) -> String {
        format!("{}/subscribers/{room_id}", self.ws_base)
    }
}
