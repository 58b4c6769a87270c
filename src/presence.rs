use std::sync::Arc;
use tracing::warn;

use crate::websockets::connection_manager::ConnectionManager;
use crate::websockets::messages::WebSocketMessage;

/// Stateless fan-out of named events over the connection registry.
///
/// Everything here is fire-and-forget: a connection that went away between
/// lookup and send simply misses the frame.
pub struct PresenceBroadcaster {
    connection_manager: Arc<dyn ConnectionManager>,
}

impl PresenceBroadcaster {
    pub fn new(connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    fn serialize(message: &WebSocketMessage) -> Option<String> {
        match serde_json::to_string(message) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "Failed to serialize outbound frame");
                None
            }
        }
    }

    /// Emit to a single connection
    pub async fn to_connection(&self, connection_id: &str, message: &WebSocketMessage) {
        if let Some(text) = Self::serialize(message) {
            self.connection_manager
                .send_to_connection(connection_id, &text)
                .await;
        }
    }

    /// Emit to every connection subscribed to a room's transport group
    pub async fn to_group(&self, group: &str, message: &WebSocketMessage) {
        if let Some(text) = Self::serialize(message) {
            self.connection_manager.send_to_group(group, &text).await;
        }
    }

    /// Emit to every live connection process-wide
    pub async fn to_all(&self, message: &WebSocketMessage) {
        if let Some(text) = Self::serialize(message) {
            self.connection_manager.broadcast(&text).await;
        }
    }

    /// Host-liveness guard used before notifying a room's host
    pub async fn is_live(&self, connection_id: &str) -> bool {
        self.connection_manager.is_connected(connection_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websockets::connection_manager::InMemoryConnectionManager;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_to_connection_delivers_serialized_frame() {
        let manager = Arc::new(InMemoryConnectionManager::new());
        let broadcaster = PresenceBroadcaster::new(manager.clone());

        let (sender, mut receiver) = mpsc::unbounded_channel();
        manager.add_connection("a".to_string(), sender).await;

        broadcaster
            .to_connection("a", &WebSocketMessage::room_destroyed())
            .await;

        let text = receiver.try_recv().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "roomDestroyed");
        assert_eq!(value["payload"]["status"], "OK");
    }

    #[tokio::test]
    async fn test_is_live_tracks_registry() {
        let manager = Arc::new(InMemoryConnectionManager::new());
        let broadcaster = PresenceBroadcaster::new(manager.clone());

        assert!(!broadcaster.is_live("a").await);

        let (sender, _receiver) = mpsc::unbounded_channel();
        manager.add_connection("a".to_string(), sender).await;
        assert!(broadcaster.is_live("a").await);

        manager.remove_connection("a").await;
        assert!(!broadcaster.is_live("a").await);
    }
}
