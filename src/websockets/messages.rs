use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::room::models::{Member, Room};

/// Event names for WebSocket frames, camelCase on the wire to match the
/// original socket.io protocol
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    // Client -> Server
    CreateRoom,
    JoinRoom,
    LeaveRoom,
    RemoveRoom,
    UpdateLocation,

    // Server -> Client
    RoomCreated,
    RoomJoined,
    UserJoinedRoom,
    RoomLeft,
    RoomRemoved,
    RoomDestroyed,
    UserLeftRoom,
    UpdateLocationResponse,
    Ack,
    Error,
}

/// Success/failure marker carried in lifecycle payloads
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ERROR")]
    Error,
}

/// Metadata for WebSocket frames
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
}

/// Base structure for WebSocket frames
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: serde_json::Value,
    /// When a client sets this on an inbound frame that supports
    /// acknowledgement, the server answers with an `ack` frame echoing it
    #[serde(rename = "ackId", skip_serializing_if = "Option::is_none")]
    pub ack_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<WebSocketMessageMeta>,
}

/// Server-to-client payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomJoinedPayload {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<Room>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomLeftPayload {
    pub status: Status,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: Status,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckPayload {
    pub ack_id: u64,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// Helper constructors for outbound frames
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
            ack_id: None,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
            }),
        }
    }

    /// Create a `roomCreated` frame carrying the full room snapshot
    pub fn room_created(room: &Room) -> Self {
        Self::new(
            MessageType::RoomCreated,
            serde_json::to_value(room).unwrap(),
        )
    }

    /// Create a successful `roomJoined` frame with room and member snapshots
    pub fn room_joined(room: &Room, member: &Member) -> Self {
        let payload = RoomJoinedPayload {
            status: Status::Ok,
            room: Some(room.clone()),
            member: Some(member.clone()),
        };
        Self::new(
            MessageType::RoomJoined,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create a failed `roomJoined` frame (unknown room)
    pub fn room_joined_error() -> Self {
        let payload = RoomJoinedPayload {
            status: Status::Error,
            room: None,
            member: None,
        };
        Self::new(
            MessageType::RoomJoined,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create a `userJoinedRoom` frame carrying the member snapshot
    pub fn user_joined_room(member: &Member) -> Self {
        Self::new(
            MessageType::UserJoinedRoom,
            serde_json::to_value(member).unwrap(),
        )
    }

    /// Create a `roomLeft` acknowledgement frame
    pub fn room_left(connection_id: &str) -> Self {
        let payload = RoomLeftPayload {
            status: Status::Ok,
            user_id: connection_id.to_string(),
        };
        Self::new(
            MessageType::RoomLeft,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create a `roomRemoved` acknowledgement frame
    pub fn room_removed() -> Self {
        let payload = StatusPayload { status: Status::Ok };
        Self::new(
            MessageType::RoomRemoved,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create a `roomDestroyed` notification frame
    pub fn room_destroyed() -> Self {
        let payload = StatusPayload { status: Status::Ok };
        Self::new(
            MessageType::RoomDestroyed,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create a `userLeftRoom` frame carrying the departed member snapshot
    pub fn user_left_room(member: &Member) -> Self {
        Self::new(
            MessageType::UserLeftRoom,
            serde_json::to_value(member).unwrap(),
        )
    }

    /// Create an `updateLocationResponse` frame relaying the payload verbatim
    pub fn update_location_response(payload: serde_json::Value) -> Self {
        Self::new(MessageType::UpdateLocationResponse, payload)
    }

    /// Create an `ack` frame answering an inbound `ackId`
    pub fn ack(ack_id: u64, success: bool) -> Self {
        let payload = AckPayload { ack_id, success };
        Self::new(MessageType::Ack, serde_json::to_value(payload).unwrap())
    }

    /// Create an `error` frame
    pub fn error(message: String) -> Self {
        let payload = ErrorPayload { message };
        Self::new(MessageType::Error, serde_json::to_value(payload).unwrap())
    }
}
