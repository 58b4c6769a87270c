use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    generators::RoomIdGenerator,
    models::{Member, Room},
    repository::{
        CreateRoomResult, JoinRoomResult, LeaveRoomResult, RemoveRoomResult, RoomRepository,
    },
    types::{CreateRoomRequest, JoinRoomRequest, LeaveRoomRequest, RemoveRoomRequest},
};
use crate::presence::PresenceBroadcaster;
use crate::shared::AppError;
use crate::websockets::connection_manager::ConnectionManager;
use crate::websockets::messages::WebSocketMessage;

/// Room lifecycle manager: applies create/join/leave/remove/disconnect
/// transitions against the room store and fans out presence notifications.
///
/// Every transition is atomic inside the repository; this service only
/// sequences transport-group membership and notification emission around
/// the returned snapshots.
pub struct RoomService {
    repository: Arc<dyn RoomRepository + Send + Sync>,
    connection_manager: Arc<dyn ConnectionManager>,
    broadcaster: Arc<PresenceBroadcaster>,
    id_generator: Arc<dyn RoomIdGenerator>,
}

impl RoomService {
    pub fn new(
        repository: Arc<dyn RoomRepository + Send + Sync>,
        connection_manager: Arc<dyn ConnectionManager>,
        broadcaster: Arc<PresenceBroadcaster>,
        id_generator: Arc<dyn RoomIdGenerator>,
    ) -> Self {
        Self {
            repository,
            connection_manager,
            broadcaster,
            id_generator,
        }
    }

    /// Create a room hosted by this connection.
    ///
    /// A connection that already hosts a room gets a silent no-op: no event,
    /// no error. Returns the created room snapshot, or None on the no-op.
    #[instrument(skip(self, request))]
    pub async fn create_room(
        &self,
        host_connection_id: &str,
        request: CreateRoomRequest,
    ) -> Result<Option<Room>, AppError> {
        let room_id = self.id_generator.next_id().await;
        let room = Room::new(
            room_id,
            host_connection_id.to_string(),
            request.host_name,
            request.host_email,
            request.position,
        );

        match self.repository.try_create_room(room).await? {
            CreateRoomResult::Created(room) => {
                self.connection_manager
                    .join_group(&room.room_id, host_connection_id)
                    .await;
                self.broadcaster
                    .to_connection(host_connection_id, &WebSocketMessage::room_created(&room))
                    .await;

                info!(
                    room_id = %room.room_id,
                    host_id = %host_connection_id,
                    "Room created and host subscribed"
                );
                Ok(Some(room))
            }
            CreateRoomResult::AlreadyHosting(existing) => {
                // Deliberately absorbed: no event, no error
                debug!(
                    host_id = %host_connection_id,
                    room_id = %existing.room_id,
                    "Duplicate create ignored"
                );
                Ok(None)
            }
        }
    }

    /// Join an existing room as a viewer.
    ///
    /// The returned boolean is the acknowledgement value: false when the
    /// room does not exist. A dead host only skips the host notification;
    /// the viewer still joins and gets a success frame.
    #[instrument(skip(self, request))]
    pub async fn join_room(
        &self,
        connection_id: &str,
        request: JoinRoomRequest,
    ) -> Result<bool, AppError> {
        let member = Member::new(
            connection_id.to_string(),
            request.user_name,
            request.user_email,
            request.position,
        );

        match self.repository.try_join_room(&request.room_id, member).await? {
            JoinRoomResult::Joined { room, member } => {
                self.connection_manager
                    .join_group(&room.room_id, connection_id)
                    .await;

                if self.broadcaster.is_live(&room.host_connection_id).await {
                    self.broadcaster
                        .to_connection(
                            &room.host_connection_id,
                            &WebSocketMessage::user_joined_room(&member),
                        )
                        .await;
                } else {
                    debug!(
                        room_id = %room.room_id,
                        host_id = %room.host_connection_id,
                        "Host not live, skipping join notification"
                    );
                }

                self.broadcaster
                    .to_connection(connection_id, &WebSocketMessage::room_joined(&room, &member))
                    .await;
                Ok(true)
            }
            JoinRoomResult::RoomNotFound => {
                debug!(
                    room_id = %request.room_id,
                    user_id = %connection_id,
                    "Join failed, room not found"
                );
                self.broadcaster
                    .to_connection(connection_id, &WebSocketMessage::room_joined_error())
                    .await;
                Ok(false)
            }
        }
    }

    /// Leave a room as a viewer.
    ///
    /// Removes the member record and notifies a live host, then always
    /// acknowledges the leaver with a `roomLeft` frame.
    #[instrument(skip(self, request))]
    pub async fn leave_room(
        &self,
        connection_id: &str,
        request: LeaveRoomRequest,
    ) -> Result<(), AppError> {
        self.connection_manager
            .leave_group(&request.room_id, connection_id)
            .await;

        match self.repository.leave_room(&request.room_id, connection_id).await? {
            LeaveRoomResult::Left { room, member } => {
                if self.broadcaster.is_live(&room.host_connection_id).await {
                    self.broadcaster
                        .to_connection(
                            &room.host_connection_id,
                            &WebSocketMessage::user_left_room(&member),
                        )
                        .await;
                }
            }
            LeaveRoomResult::NotAMember | LeaveRoomResult::RoomNotFound => {
                debug!(
                    room_id = %request.room_id,
                    user_id = %connection_id,
                    "Leave with nothing to remove"
                );
            }
        }

        self.broadcaster
            .to_connection(connection_id, &WebSocketMessage::room_left(connection_id))
            .await;
        Ok(())
    }

    /// Remove the room hosted by this connection.
    ///
    /// Members are notified with `roomDestroyed` one by one; the caller is
    /// always acknowledged with `roomRemoved` and unsubscribed from the
    /// named group, whether or not a room was found.
    #[instrument(skip(self, request))]
    pub async fn remove_room(
        &self,
        connection_id: &str,
        request: RemoveRoomRequest,
    ) -> Result<(), AppError> {
        match self.repository.remove_room_by_host(connection_id).await? {
            RemoveRoomResult::Removed(room) => {
                self.destroy_room_notifications(&room).await;
            }
            RemoveRoomResult::NotHosting => {
                debug!(host_id = %connection_id, "Remove with no hosted room");
            }
        }

        self.broadcaster
            .to_connection(connection_id, &WebSocketMessage::room_removed())
            .await;
        self.connection_manager
            .leave_group(&request.room_id, connection_id)
            .await;
        Ok(())
    }

    /// Apply disconnect teardown for a connection that just went away.
    ///
    /// The connection must already be gone from the registry so liveness
    /// checks see it dead. Host branch runs first, then viewer branch.
    #[instrument(skip(self))]
    pub async fn handle_disconnect(&self, connection_id: &str) -> Result<(), AppError> {
        let cleanup = self.repository.cleanup_connection(connection_id).await?;

        if let Some(room) = &cleanup.destroyed {
            self.destroy_room_notifications(room).await;
        }

        for (room, member) in &cleanup.departures {
            if self.broadcaster.is_live(&room.host_connection_id).await {
                self.broadcaster
                    .to_connection(
                        &room.host_connection_id,
                        &WebSocketMessage::user_left_room(member),
                    )
                    .await;
            }
        }

        Ok(())
    }

    /// Read-only lookup used by the HTTP glue and tests
    pub async fn get_room(&self, room_id: &str) -> Result<Option<Room>, AppError> {
        self.repository.get_room(room_id).await
    }

    async fn destroy_room_notifications(&self, room: &Room) {
        let destroyed = WebSocketMessage::room_destroyed();
        for member in &room.members {
            self.broadcaster
                .to_connection(&member.connection_id, &destroyed)
                .await;
        }
        self.connection_manager.drop_group(&room.room_id).await;
    }
}
