use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::models::{Member, Room};
use crate::shared::AppError;

/// Result of attempting to create a room
#[derive(Debug, Clone)]
pub enum CreateRoomResult {
    /// Room was inserted, returns the stored snapshot
    Created(Room),
    /// The connection already hosts a room; nothing was changed
    AlreadyHosting(Room),
}

/// Result of attempting to join a room
#[derive(Debug, Clone)]
pub enum JoinRoomResult {
    /// Member was appended, returns the updated room and the stored member
    /// snapshot (host position stamped from the room's anchor)
    Joined { room: Room, member: Member },
    /// Room does not exist
    RoomNotFound,
}

/// Result of attempting to leave a room
#[derive(Debug, Clone)]
pub enum LeaveRoomResult {
    /// Member was removed, returns the updated room and the removed snapshot
    Left { room: Room, member: Member },
    /// Connection was not a member of the room
    NotAMember,
    /// Room does not exist
    RoomNotFound,
}

/// Result of attempting to remove a room by its host
#[derive(Debug, Clone)]
pub enum RemoveRoomResult {
    /// Room was deleted, returns the final snapshot for notification fan-out
    Removed(Room),
    /// The connection hosts no room; nothing was changed
    NotHosting,
}

/// Everything that changed when a connection went away. Both branches are
/// applied in one critical section: the host branch first, then the viewer
/// branch, so a room destroyed in branch one never produces a departure.
#[derive(Debug, Clone, Default)]
pub struct DisconnectCleanup {
    /// The room this connection hosted, if any (already deleted)
    pub destroyed: Option<Room>,
    /// For each room the connection was a member of: the room after removal
    /// and the removed member snapshot
    pub departures: Vec<(Room, Member)>,
}

/// Trait for room store operations.
///
/// Every mutating operation is an atomic compound transition: lookup,
/// invariant check, and mutation happen under one lock so concurrent
/// handlers can never observe a half-applied state or violate the
/// one-room-per-host uniqueness rule.
#[async_trait]
pub trait RoomRepository {
    /// Insert a room unless its host already owns one
    async fn try_create_room(&self, room: Room) -> Result<CreateRoomResult, AppError>;

    async fn get_room(&self, room_id: &str) -> Result<Option<Room>, AppError>;

    /// Find the room hosted by a connection, if any
    async fn find_by_host(&self, host_connection_id: &str) -> Result<Option<Room>, AppError>;

    /// Find every room where the connection appears as a member
    async fn find_rooms_with_member(&self, connection_id: &str) -> Result<Vec<Room>, AppError>;

    /// Append a member to a room, stamping its host position snapshot
    async fn try_join_room(&self, room_id: &str, member: Member)
        -> Result<JoinRoomResult, AppError>;

    /// Remove a member from a room by connection id
    async fn leave_room(
        &self,
        room_id: &str,
        connection_id: &str,
    ) -> Result<LeaveRoomResult, AppError>;

    /// Delete the room hosted by a connection
    async fn remove_room_by_host(
        &self,
        host_connection_id: &str,
    ) -> Result<RemoveRoomResult, AppError>;

    /// Apply both disconnect branches (host teardown, then viewer removal)
    async fn cleanup_connection(&self, connection_id: &str)
        -> Result<DisconnectCleanup, AppError>;
}

/// Two indexes for O(1) lookup: rooms by id, and room id by host
/// connection id. Kept consistent by every transition.
#[derive(Default)]
struct RoomTable {
    rooms: HashMap<String, Room>,
    host_index: HashMap<String, String>,
}

impl RoomTable {
    fn insert(&mut self, room: Room) {
        self.host_index
            .insert(room.host_connection_id.clone(), room.room_id.clone());
        self.rooms.insert(room.room_id.clone(), room);
    }

    fn delete(&mut self, room_id: &str) -> Option<Room> {
        let room = self.rooms.remove(room_id)?;
        self.host_index.remove(&room.host_connection_id);
        Some(room)
    }

    fn room_by_host(&self, host_connection_id: &str) -> Option<&Room> {
        let room_id = self.host_index.get(host_connection_id)?;
        self.rooms.get(room_id)
    }
}

/// In-memory implementation of RoomRepository
pub struct InMemoryRoomRepository {
    table: Mutex<RoomTable>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            table: Mutex::new(RoomTable::default()),
        }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    #[instrument(skip(self, room))]
    async fn try_create_room(&self, room: Room) -> Result<CreateRoomResult, AppError> {
        let mut table = self.table.lock().unwrap();

        if let Some(existing) = table.room_by_host(&room.host_connection_id) {
            debug!(
                host_id = %room.host_connection_id,
                room_id = %existing.room_id,
                "Host already owns a room, create is a no-op"
            );
            return Ok(CreateRoomResult::AlreadyHosting(existing.clone()));
        }

        if table.rooms.contains_key(&room.room_id) {
            warn!(room_id = %room.room_id, "Room id collision on create");
            return Err(AppError::Internal);
        }

        let snapshot = room.clone();
        table.insert(room);

        info!(
            room_id = %snapshot.room_id,
            host_id = %snapshot.host_connection_id,
            "Room created"
        );
        Ok(CreateRoomResult::Created(snapshot))
    }

    #[instrument(skip(self))]
    async fn get_room(&self, room_id: &str) -> Result<Option<Room>, AppError> {
        let table = self.table.lock().unwrap();
        Ok(table.rooms.get(room_id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_host(&self, host_connection_id: &str) -> Result<Option<Room>, AppError> {
        let table = self.table.lock().unwrap();
        Ok(table.room_by_host(host_connection_id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_rooms_with_member(&self, connection_id: &str) -> Result<Vec<Room>, AppError> {
        let table = self.table.lock().unwrap();
        Ok(table
            .rooms
            .values()
            .filter(|room| room.has_member(connection_id))
            .cloned()
            .collect())
    }

    #[instrument(skip(self, member))]
    async fn try_join_room(
        &self,
        room_id: &str,
        member: Member,
    ) -> Result<JoinRoomResult, AppError> {
        let mut table = self.table.lock().unwrap();

        let room = match table.rooms.get_mut(room_id) {
            Some(room) => room,
            None => {
                debug!(room_id = %room_id, "Room not found");
                return Ok(JoinRoomResult::RoomNotFound);
            }
        };

        let stored = room.add_member(member);
        let updated_room = room.clone();

        info!(
            room_id = %room_id,
            user_id = %stored.connection_id,
            member_count = updated_room.member_count(),
            "Member joined room"
        );

        Ok(JoinRoomResult::Joined {
            room: updated_room,
            member: stored,
        })
    }

    #[instrument(skip(self))]
    async fn leave_room(
        &self,
        room_id: &str,
        connection_id: &str,
    ) -> Result<LeaveRoomResult, AppError> {
        let mut table = self.table.lock().unwrap();

        let room = match table.rooms.get_mut(room_id) {
            Some(room) => room,
            None => {
                debug!(room_id = %room_id, "Room not found");
                return Ok(LeaveRoomResult::RoomNotFound);
            }
        };

        match room.remove_member(connection_id) {
            Some(member) => {
                let updated_room = room.clone();
                info!(
                    room_id = %room_id,
                    user_id = %connection_id,
                    member_count = updated_room.member_count(),
                    "Member left room"
                );
                Ok(LeaveRoomResult::Left {
                    room: updated_room,
                    member,
                })
            }
            None => {
                debug!(room_id = %room_id, user_id = %connection_id, "Not a member");
                Ok(LeaveRoomResult::NotAMember)
            }
        }
    }

    #[instrument(skip(self))]
    async fn remove_room_by_host(
        &self,
        host_connection_id: &str,
    ) -> Result<RemoveRoomResult, AppError> {
        let mut table = self.table.lock().unwrap();

        let room_id = match table.host_index.get(host_connection_id) {
            Some(room_id) => room_id.clone(),
            None => {
                debug!(host_id = %host_connection_id, "Connection hosts no room");
                return Ok(RemoveRoomResult::NotHosting);
            }
        };

        match table.delete(&room_id) {
            Some(room) => {
                info!(
                    room_id = %room.room_id,
                    host_id = %host_connection_id,
                    member_count = room.member_count(),
                    "Room removed"
                );
                Ok(RemoveRoomResult::Removed(room))
            }
            None => Ok(RemoveRoomResult::NotHosting),
        }
    }

    #[instrument(skip(self))]
    async fn cleanup_connection(
        &self,
        connection_id: &str,
    ) -> Result<DisconnectCleanup, AppError> {
        let mut table = self.table.lock().unwrap();
        let mut cleanup = DisconnectCleanup::default();

        // Branch one: the connection hosted a room
        if let Some(room_id) = table.host_index.get(connection_id).cloned() {
            if let Some(room) = table.delete(&room_id) {
                info!(
                    room_id = %room.room_id,
                    host_id = %connection_id,
                    member_count = room.member_count(),
                    "Host disconnected, room destroyed"
                );
                cleanup.destroyed = Some(room);
            }
        }

        // Branch two: the connection was a viewer in zero or more rooms
        for room in table.rooms.values_mut() {
            if let Some(member) = room.remove_member(connection_id) {
                info!(
                    room_id = %room.room_id,
                    user_id = %connection_id,
                    "Viewer disconnected, removed from room"
                );
                cleanup.departures.push((room.clone(), member));
            }
        }

        Ok(cleanup)
    }
}
