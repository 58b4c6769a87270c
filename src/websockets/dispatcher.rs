use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::presence::PresenceBroadcaster;
use crate::relay::LocationRelay;
use crate::room::service::RoomService;
use crate::room::types::{
    CreateRoomRequest, JoinRoomRequest, LeaveRoomRequest, RemoveRoomRequest,
};
use crate::websockets::messages::{MessageType, WebSocketMessage};

use super::socket::MessageHandler;

/// Routes inbound frames to the room lifecycle service and the location
/// relay. One instance is shared by every connection.
pub struct EventDispatcher {
    room_service: Arc<RoomService>,
    location_relay: Arc<LocationRelay>,
    broadcaster: Arc<PresenceBroadcaster>,
}

impl EventDispatcher {
    pub fn new(
        room_service: Arc<RoomService>,
        location_relay: Arc<LocationRelay>,
        broadcaster: Arc<PresenceBroadcaster>,
    ) -> Self {
        Self {
            room_service,
            location_relay,
            broadcaster,
        }
    }

    /// Lenient payload decode: missing fields fall back to defaults,
    /// a wholly malformed payload becomes an all-default request
    fn decode<T: serde::de::DeserializeOwned + Default>(payload: serde_json::Value) -> T {
        serde_json::from_value(payload).unwrap_or_default()
    }
}

#[async_trait]
impl MessageHandler for EventDispatcher {
    async fn handle_message(&self, connection_id: &str, message: String) {
        let frame = match serde_json::from_str::<WebSocketMessage>(&message) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(
                    user_id = %connection_id,
                    error = %e,
                    "Failed to parse WebSocket frame"
                );
                return;
            }
        };

        debug!(
            user_id = %connection_id,
            message_type = ?frame.message_type,
            "Received frame"
        );

        match frame.message_type {
            MessageType::CreateRoom => {
                let request: CreateRoomRequest = Self::decode(frame.payload);
                if let Err(e) = self.room_service.create_room(connection_id, request).await {
                    warn!(user_id = %connection_id, error = %e, "createRoom failed");
                }
            }
            MessageType::JoinRoom => {
                let request: JoinRoomRequest = Self::decode(frame.payload);
                match self.room_service.join_room(connection_id, request).await {
                    Ok(success) => {
                        // Socket.io-style callback, consolidated into an
                        // explicit ack frame when the client asked for one
                        if let Some(ack_id) = frame.ack_id {
                            self.broadcaster
                                .to_connection(
                                    connection_id,
                                    &WebSocketMessage::ack(ack_id, success),
                                )
                                .await;
                        }
                    }
                    Err(e) => {
                        warn!(user_id = %connection_id, error = %e, "joinRoom failed");
                    }
                }
            }
            MessageType::LeaveRoom => {
                let request: LeaveRoomRequest = Self::decode(frame.payload);
                if let Err(e) = self.room_service.leave_room(connection_id, request).await {
                    warn!(user_id = %connection_id, error = %e, "leaveRoom failed");
                }
            }
            MessageType::RemoveRoom => {
                let request: RemoveRoomRequest = Self::decode(frame.payload);
                if let Err(e) = self.room_service.remove_room(connection_id, request).await {
                    warn!(user_id = %connection_id, error = %e, "removeRoom failed");
                }
            }
            MessageType::UpdateLocation => {
                if let Err(e) = self
                    .location_relay
                    .relay(connection_id, frame.payload)
                    .await
                {
                    warn!(user_id = %connection_id, error = %e, "updateLocation failed");
                }
            }
            other => {
                // Server-to-client names arriving inbound get the generic
                // boundary response
                debug!(
                    user_id = %connection_id,
                    message_type = ?other,
                    "Unhandled event name"
                );
                self.broadcaster
                    .to_connection(
                        connection_id,
                        &WebSocketMessage::error("Unhandled event".to_string()),
                    )
                    .await;
            }
        }
    }
}
