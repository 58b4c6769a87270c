use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Registry of live connections and their transport groups.
///
/// A "group" is the room-addressed delivery target: connections subscribed
/// to a group receive every message sent to it. Groups only track
/// membership; the room store remains the source of truth for who is in a
/// room.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn add_connection(&self, connection_id: String, sender: mpsc::UnboundedSender<String>);

    /// Drop a connection and strip it from every group
    async fn remove_connection(&self, connection_id: &str);

    /// Whether the connection currently has a live handle
    async fn is_connected(&self, connection_id: &str) -> bool;

    async fn send_to_connection(&self, connection_id: &str, message: &str);

    /// Send to every connection subscribed to a group
    async fn send_to_group(&self, group: &str, message: &str);

    /// Send to every live connection process-wide
    async fn broadcast(&self, message: &str);

    async fn join_group(&self, group: &str, connection_id: &str);

    async fn leave_group(&self, group: &str, connection_id: &str);

    /// Remove a group entirely (when its room is destroyed)
    async fn drop_group(&self, group: &str);
}

pub struct InMemoryConnectionManager {
    // connection_id -> sender
    connections: Arc<RwLock<HashMap<String, mpsc::UnboundedSender<String>>>>,
    // group -> subscribed connection ids
    groups: Arc<RwLock<HashMap<String, HashSet<String>>>>,
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            groups: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, connection_id: String, sender: mpsc::UnboundedSender<String>) {
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, sender);
    }

    async fn remove_connection(&self, connection_id: &str) {
        let mut connections = self.connections.write().await;
        connections.remove(connection_id);
        drop(connections);

        let mut groups = self.groups.write().await;
        for members in groups.values_mut() {
            members.remove(connection_id);
        }
        groups.retain(|_, members| !members.is_empty());
    }

    async fn is_connected(&self, connection_id: &str) -> bool {
        let connections = self.connections.read().await;
        connections.contains_key(connection_id)
    }

    async fn send_to_connection(&self, connection_id: &str, message: &str) {
        let connections = self.connections.read().await;
        if let Some(sender) = connections.get(connection_id) {
            let _ = sender.send(message.to_string());
        }
    }

    async fn send_to_group(&self, group: &str, message: &str) {
        let groups = self.groups.read().await;
        let Some(members) = groups.get(group) else {
            return;
        };

        let connections = self.connections.read().await;
        for connection_id in members {
            if let Some(sender) = connections.get(connection_id) {
                let _ = sender.send(message.to_string());
            }
        }
    }

    async fn broadcast(&self, message: &str) {
        let connections = self.connections.read().await;
        for sender in connections.values() {
            let _ = sender.send(message.to_string());
        }
    }

    async fn join_group(&self, group: &str, connection_id: &str) {
        let mut groups = self.groups.write().await;
        groups
            .entry(group.to_string())
            .or_default()
            .insert(connection_id.to_string());
    }

    async fn leave_group(&self, group: &str, connection_id: &str) {
        let mut groups = self.groups.write().await;
        if let Some(members) = groups.get_mut(group) {
            members.remove(connection_id);
            if members.is_empty() {
                groups.remove(group);
            }
        }
    }

    async fn drop_group(&self, group: &str) {
        let mut groups = self.groups.write().await;
        groups.remove(group);
    }
}
