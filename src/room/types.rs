use serde::{Deserialize, Serialize};

use super::models::GeoPosition;

/// Inbound payload for `createRoom`. Fields the client omits default to
/// empty rather than failing the frame (pass-through behavior).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRoomRequest {
    pub position: GeoPosition,
    pub host_name: String,
    pub host_email: String,
}

/// Inbound payload for `joinRoom`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JoinRoomRequest {
    pub room_id: String,
    pub user_name: String,
    pub user_email: String,
    pub position: GeoPosition,
}

/// Inbound payload for `leaveRoom`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeaveRoomRequest {
    pub room_id: String,
}

/// Inbound payload for `removeRoom`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoveRoomRequest {
    pub room_id: String,
}
