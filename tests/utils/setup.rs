use std::sync::Arc;

use geoshare::room::generators::SequentialRoomIdGenerator;
use geoshare::room::repository::InMemoryRoomRepository;
use geoshare::{
    ConnectionManager, EventDispatcher, LocationRelay, MessageHandler, PresenceBroadcaster,
    RelayScope, RoomService,
};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// A fully wired broker core over the mock connection manager. Frames are
/// pushed in through the dispatcher exactly as the socket layer would.
pub struct TestSetup {
    pub dispatcher: EventDispatcher,
    pub room_service: Arc<RoomService>,
    pub connections: Arc<MockConnectionManager>,
}

pub struct TestSetupBuilder {
    relay_scope: RelayScope,
    connections: Vec<String>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            relay_scope: RelayScope::Room,
            connections: vec![],
        }
    }

    pub fn with_relay_scope(mut self, scope: RelayScope) -> Self {
        self.relay_scope = scope;
        self
    }

    pub fn with_connections(mut self, ids: Vec<&str>) -> Self {
        self.connections = ids.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub async fn build(self) -> TestSetup {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let connections = Arc::new(MockConnectionManager::new());
        let broadcaster = Arc::new(PresenceBroadcaster::new(connections.clone()));

        let room_service = Arc::new(RoomService::new(
            repository.clone(),
            connections.clone(),
            broadcaster.clone(),
            Arc::new(SequentialRoomIdGenerator::new()),
        ));
        let location_relay = Arc::new(LocationRelay::new(
            broadcaster.clone(),
            repository,
            self.relay_scope,
        ));

        let dispatcher =
            EventDispatcher::new(room_service.clone(), location_relay, broadcaster);

        for connection_id in &self.connections {
            connections.connect(connection_id).await;
        }

        TestSetup {
            dispatcher,
            room_service,
            connections,
        }
    }
}

impl TestSetup {
    /// Push a raw inbound frame through the dispatcher
    pub async fn send_frame(&self, connection_id: &str, frame: serde_json::Value) {
        self.dispatcher
            .handle_message(connection_id, frame.to_string())
            .await;
    }

    pub async fn send_create_room(&self, connection_id: &str, host_name: &str) {
        self.send_frame(
            connection_id,
            serde_json::json!({
                "type": "createRoom",
                "payload": {
                    "position": {"lat": 10.0, "lng": 20.0},
                    "hostName": host_name,
                    "hostEmail": format!("{}@example.com", host_name),
                },
            }),
        )
        .await;
    }

    pub async fn send_join_room(&self, connection_id: &str, room_id: &str, user_name: &str) {
        self.send_frame(
            connection_id,
            serde_json::json!({
                "type": "joinRoom",
                "payload": {
                    "roomId": room_id,
                    "userName": user_name,
                    "userEmail": format!("{}@example.com", user_name),
                    "position": {"lat": 1.0, "lng": 2.0},
                },
                "ackId": 1,
            }),
        )
        .await;
    }

    pub async fn send_leave_room(&self, connection_id: &str, room_id: &str) {
        self.send_frame(
            connection_id,
            serde_json::json!({
                "type": "leaveRoom",
                "payload": {"roomId": room_id},
            }),
        )
        .await;
    }

    pub async fn send_remove_room(&self, connection_id: &str, room_id: &str) {
        self.send_frame(
            connection_id,
            serde_json::json!({
                "type": "removeRoom",
                "payload": {"roomId": room_id},
            }),
        )
        .await;
    }

    pub async fn send_update_location(&self, connection_id: &str, payload: serde_json::Value) {
        self.send_frame(
            connection_id,
            serde_json::json!({
                "type": "updateLocation",
                "payload": payload,
            }),
        )
        .await;
    }

    /// Simulate a transport disconnect the way the socket layer does it:
    /// registry removal first, then lifecycle cleanup
    pub async fn disconnect(&self, connection_id: &str) {
        self.connections.remove_connection(connection_id).await;
        self.room_service
            .handle_disconnect(connection_id)
            .await
            .unwrap();
    }

    /// Room id assigned to the first created room by the sequential
    /// generator
    pub fn first_room_id() -> &'static str {
        "1"
    }
}
