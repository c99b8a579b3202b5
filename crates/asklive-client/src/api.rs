//! REST calls against the asklive server.

use asklive_proto::rest::{
    ApiMessage, CreateMessageRequest, CreateMessageResponse, CreateRoomRequest,
    CreateRoomResponse, GetRoomMessagesResponse, GetRoomsResponse, Room,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Thin reqwest wrapper over the server's REST surface.
///
/// None of these calls mutate room state; confirmed changes come back
/// through the subscription socket as events.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Initial snapshot of a room's messages, in server order. A `null`
    /// message list reads as an empty room, not an error.
    pub async fn fetch_messages(&self, room_id: &str) -> Result<Vec<ApiMessage>> {
        let response = self
            .http
            .get(self.config.messages_url(room_id))
            .send()
            .await?;
        match response.status().as_u16() {
            200 => {
                let body: GetRoomMessagesResponse = response.json().await?;
                Ok(body.messages.unwrap_or_default())
            }
            404 => Err(ClientError::RoomNotFound(room_id.to_string())),
            status => Err(ClientError::Status {
                status,
                action: "fetch messages",
            }),
        }
    }

    pub async fn create_room(&self, theme: &str) -> Result<String> {
        let response = self
            .http
            .post(self.config.rooms_url())
            .json(&CreateRoomRequest {
                theme: theme.to_string(),
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
                action: "create room",
            });
        }
        let body: CreateRoomResponse = response.json().await?;
        Ok(body.id)
    }

    pub async fn list_rooms(&self) -> Result<Vec<Room>> {
        let response = self.http.get(self.config.rooms_url()).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
                action: "list rooms",
            });
        }
        let body: GetRoomsResponse = response.json().await?;
        Ok(body.rooms)
    }

    /// Post a new question and return its server-assigned id.
    ///
    /// No optimistic insert happens anywhere: the message shows up in room
    /// state when its `message_created` event comes back.
    pub async fn submit_message(&self, room_id: &str, text: &str) -> Result<String> {
        let response = self
            .http
            .post(self.config.messages_url(room_id))
            .json(&CreateMessageRequest {
                message: text.to_string(),
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
                action: "submit message",
            });
        }
        let body: CreateMessageResponse = response.json().await?;
        Ok(body.id)
    }

    pub async fn submit_reaction(&self, room_id: &str, message_id: &str) -> Result<()> {
        let response = self
            .http
            .patch(self.config.message_url(room_id, message_id, "reactions"))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::Status {
                status: response.status().as_u16(),
                action: "submit reaction",
            })
        }
    }

    /// Remove this client's reaction. The server answers 204 even when
    /// the count is already zero, so that case settles as success.
    pub async fn retract_reaction(&self, room_id: &str, message_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.config.message_url(room_id, message_id, "reactions"))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::Status {
                status: response.status().as_u16(),
                action: "retract reaction",
            })
        }
    }

    /// Presenter action: mark a question as answered.
    pub async fn mark_answered(&self, room_id: &str, message_id: &str) -> Result<()> {
        let response = self
            .http
            .patch(self.config.message_url(room_id, message_id, "answers"))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::Status {
                status: response.status().as_u16(),
                action: "mark answered",
            })
        }
    }
}
