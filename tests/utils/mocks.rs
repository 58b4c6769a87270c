use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use geoshare::websockets::ConnectionManager;

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Connection manager that records every delivered frame per connection
/// instead of writing to real sockets.
#[derive(Clone)]
pub struct MockConnectionManager {
    sent_messages: Arc<RwLock<HashMap<String, Vec<String>>>>,
    connected: Arc<RwLock<HashSet<String>>>,
    groups: Arc<RwLock<HashMap<String, HashSet<String>>>>,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self {
            sent_messages: Arc::new(RwLock::new(HashMap::new())),
            connected: Arc::new(RwLock::new(HashSet::new())),
            groups: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn connect(&self, connection_id: &str) {
        self.connected.write().await.insert(connection_id.to_string());
    }

    pub async fn frames_for(&self, connection_id: &str) -> Vec<serde_json::Value> {
        self.sent_messages
            .read()
            .await
            .get(connection_id)
            .map(|messages| {
                messages
                    .iter()
                    .map(|text| serde_json::from_str(text).unwrap())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn frames_of_type(
        &self,
        connection_id: &str,
        message_type: &str,
    ) -> Vec<serde_json::Value> {
        self.frames_for(connection_id)
            .await
            .into_iter()
            .filter(|frame| frame["type"] == message_type)
            .collect()
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }

    pub async fn group_members(&self, group: &str) -> HashSet<String> {
        self.groups
            .read()
            .await
            .get(group)
            .cloned()
            .unwrap_or_default()
    }

    async fn record(&self, connection_id: &str, message: &str) {
        self.sent_messages
            .write()
            .await
            .entry(connection_id.to_string())
            .or_default()
            .push(message.to_string());
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn add_connection(
        &self,
        connection_id: String,
        _sender: mpsc::UnboundedSender<String>,
    ) {
        self.connect(&connection_id).await;
    }

    async fn remove_connection(&self, connection_id: &str) {
        self.connected.write().await.remove(connection_id);
        let mut groups = self.groups.write().await;
        for members in groups.values_mut() {
            members.remove(connection_id);
        }
    }

    async fn is_connected(&self, connection_id: &str) -> bool {
        self.connected.read().await.contains(connection_id)
    }

    async fn send_to_connection(&self, connection_id: &str, message: &str) {
        if self.connected.read().await.contains(connection_id) {
            self.record(connection_id, message).await;
        }
    }

    async fn send_to_group(&self, group: &str, message: &str) {
        let members = self.group_members(group).await;
        for connection_id in members {
            self.send_to_connection(&connection_id, message).await;
        }
    }

    async fn broadcast(&self, message: &str) {
        let connected: Vec<String> = self.connected.read().await.iter().cloned().collect();
        for connection_id in connected {
            self.record(&connection_id, message).await;
        }
    }

    async fn join_group(&self, group: &str, connection_id: &str) {
        self.groups
            .write()
            .await
            .entry(group.to_string())
            .or_default()
            .insert(connection_id.to_string());
    }

    async fn leave_group(&self, group: &str, connection_id: &str) {
        if let Some(members) = self.groups.write().await.get_mut(group) {
            members.remove(connection_id);
        }
    }

    async fn drop_group(&self, group: &str) {
        self.groups.write().await.remove(group);
    }
}
