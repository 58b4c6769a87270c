use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic coordinate pair as exchanged on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
}

impl GeoPosition {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A viewer who joined a room. Snapshots of this struct are embedded in
/// outbound payloads; the store keeps the only live copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Connection id of the viewer, unique within a room
    #[serde(rename = "userId")]
    pub connection_id: String,
    pub user_name: String,
    pub user_email: String,
    /// Viewer's own last-known location, supplied at join
    pub position: GeoPosition,
    /// The room's anchor position captured at join time
    pub host_position: GeoPosition,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn new(
        connection_id: String,
        user_name: String,
        user_email: String,
        position: GeoPosition,
    ) -> Self {
        let now = Utc::now();
        Self {
            connection_id,
            user_name,
            user_email,
            position,
            // Stamped from the room's anchor when the member is appended
            host_position: GeoPosition::default(),
            joined_at: now,
            updated_at: now,
        }
    }
}

/// A location-sharing room: one host anchored at a position, zero or more
/// viewers. Member order is join order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_id: String,
    /// Connection id of the host; immutable for the room's lifetime
    #[serde(rename = "hostId")]
    pub host_connection_id: String,
    pub host_name: String,
    pub host_email: String,
    /// Anchor position supplied at creation; never updated afterwards
    pub position: GeoPosition,
    pub members: Vec<Member>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    pub fn new(
        room_id: String,
        host_connection_id: String,
        host_name: String,
        host_email: String,
        position: GeoPosition,
    ) -> Self {
        let now = Utc::now();
        Self {
            room_id,
            host_connection_id,
            host_name,
            host_email,
            position,
            members: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Check whether a connection is a member (the host is not a member)
    pub fn has_member(&self, connection_id: &str) -> bool {
        self.members.iter().any(|m| m.connection_id == connection_id)
    }

    pub fn get_member(&self, connection_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.connection_id == connection_id)
    }

    /// Append a member, stamping its host position from the room's anchor.
    /// A connection already present (or the host itself) is not appended.
    pub fn add_member(&mut self, mut member: Member) -> Member {
        member.host_position = self.position;
        if member.connection_id != self.host_connection_id
            && !self.has_member(&member.connection_id)
        {
            self.members.push(member.clone());
            self.updated_at = Utc::now();
        }
        member
    }

    /// Remove a member by connection id, returning the removed record
    pub fn remove_member(&mut self, connection_id: &str) -> Option<Member> {
        let index = self
            .members
            .iter()
            .position(|m| m.connection_id == connection_id)?;
        self.updated_at = Utc::now();
        Some(self.members.remove(index))
    }

    /// Connection ids of all members, in join order
    pub fn member_ids(&self) -> Vec<String> {
        self.members.iter().map(|m| m.connection_id.clone()).collect()
    }
}
